//! Token and field span computation for one line of fixed-width text.
//!
//! A token is a maximal non-whitespace run. The field owned by a token is the
//! span a marker may overwrite: it can absorb whitespace to the left of the
//! token but never text belonging to a neighbour, and it always ends exactly
//! where its token ends. The first field keeps at least one column of left
//! margin unless the token itself touches the line start.

use crate::domain::Span;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineFields {
    tokens: Vec<Span>,
    fields: Vec<Span>,
}

impl LineFields {
    pub fn tokens(&self) -> &[Span] {
        &self.tokens
    }

    pub fn fields(&self) -> &[Span] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token and field spans for a 1-based column index.
    pub fn column(&self, column: usize) -> Option<(Span, Span)> {
        if column == 0 {
            return None;
        }
        let index = column - 1;
        Some((*self.tokens.get(index)?, *self.fields.get(index)?))
    }
}

/// Computes aligned token and field spans for `line`.
///
/// Tokens are located by a single left-to-right scan, so a token text that
/// recurs on the line can never be attributed to the wrong position. Offsets
/// are character offsets, matching the splice arithmetic in the injector.
pub fn compute(line: &str) -> LineFields {
    let chars: Vec<char> = line.chars().collect();

    let mut tokens = Vec::new();
    let mut cursor = 0;
    while cursor < chars.len() {
        if chars[cursor].is_whitespace() {
            cursor += 1;
            continue;
        }
        let start = cursor;
        while cursor < chars.len() && !chars[cursor].is_whitespace() {
            cursor += 1;
        }
        tokens.push(Span::new(start, cursor));
    }

    let mut fields: Vec<Span> = Vec::with_capacity(tokens.len());
    for (index, token) in tokens.iter().enumerate() {
        let start = if index == 0 {
            // Extend over the leading whitespace but keep one column of
            // margin at the line edge unless the token starts there.
            let mut left = token.start;
            while left > 1 && chars[left - 1].is_whitespace() {
                left -= 1;
            }
            left
        } else {
            token.start.min(fields[index - 1].end + 1)
        };
        fields.push(Span::new(start, token.end));
    }

    LineFields { tokens, fields }
}
