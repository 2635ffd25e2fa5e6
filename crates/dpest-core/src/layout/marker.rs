//! Marker construction and equal-width splicing into a source line.

use crate::domain::{DpestError, DpestResult, Span};

/// Smallest field able to hold a delimited marker: two delimiters plus a
/// one-character identifier.
pub const MIN_FIELD_WIDTH: usize = 3;

/// Replaces `field` in `line` with a right-aligned `<delimiter><identifier>
/// <delimiter>` marker, shrinking the identifier from the right until the
/// marker fits. The rewritten line always has the same character count as
/// the original.
pub fn inject(
    line: &str,
    field: Span,
    delimiter: char,
    identifier: &str,
) -> DpestResult<String> {
    let width = field.width();
    if width < MIN_FIELD_WIDTH {
        return Err(DpestError::layout(
            "LAYOUT.FIELD_WIDTH",
            format!(
                "field at columns {}..{} is {} characters wide; a delimited marker needs at least {}",
                field.start + 1,
                field.end,
                width,
                MIN_FIELD_WIDTH
            ),
        ));
    }

    let mut identifier: String = identifier.to_string();
    let mut core = format!("{delimiter}{identifier}{delimiter}");
    while core.chars().count() > width && identifier.chars().count() > 1 {
        identifier.pop();
        core = format!("{delimiter}{identifier}{delimiter}");
    }

    let padding = width - core.chars().count();
    let chars: Vec<char> = line.chars().collect();
    let head: String = chars[..field.start].iter().collect();
    let tail: String = chars[field.end..].iter().collect();
    Ok(format!("{head}{:padding$}{core}{tail}", "", padding = padding))
}
