//! Two-pass template assembly.
//!
//! Pass 1 walks every parameter spec against the pristine source lines,
//! validates its (line, column) address, checks the field can hold a marker
//! and allocates the truncated identifier. Pass 2 re-derives each field from
//! the pristine lines and splices markers into a shared mutable buffer.
//! Field geometry is always computed against the unmodified source, so
//! parameters sharing a line compose in any order; because every splice is
//! an equal-width replacement, the pristine coordinates stay valid for the
//! buffer throughout. Nothing is written until both passes succeed.

use super::{ident, marker, span};
use crate::domain::{
    DpestError, DpestResult, GeneratedParameterSet, ParameterEntry, ParameterSpec, Span,
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledTemplate {
    pub parameters: GeneratedParameterSet,
    pub lines: Vec<String>,
}

/// Rewrites `lines` per `specs` and returns the marked lines (with the
/// `<first_line_token> <delimiter>` header prepended) plus the parameter
/// bundle keyed by truncated identifier. `source` labels error messages.
pub fn assemble(
    lines: &[String],
    specs: &[ParameterSpec],
    delimiter: char,
    fill: char,
    first_line_token: &str,
    source: &str,
) -> DpestResult<AssembledTemplate> {
    let mut used = BTreeSet::new();
    let mut identifiers = Vec::with_capacity(specs.len());
    for spec in specs {
        let (_, field) = locate(lines, spec, source)?;
        if field.width() < marker::MIN_FIELD_WIDTH {
            return Err(DpestError::layout(
                "LAYOUT.FIELD_WIDTH",
                format!(
                    "parameter '{}' at line {}, column {} of '{}' occupies a {}-character field; a delimited marker needs at least {}",
                    spec.name,
                    spec.line,
                    spec.column,
                    source,
                    field.width(),
                    marker::MIN_FIELD_WIDTH
                ),
            ));
        }
        let max_id_len = field.width() - 2;
        identifiers.push(ident::allocate(&spec.name, max_id_len, fill, &mut used));
    }

    let mut buffer: Vec<String> = lines.to_vec();
    let mut parameters = GeneratedParameterSet::default();
    for (spec, id) in specs.iter().zip(&identifiers) {
        let (token, field) = locate(lines, spec, source)?;
        let pristine = &lines[spec.line - 1];
        let value: String = pristine
            .chars()
            .skip(token.start)
            .take(token.width())
            .collect();
        parameters.push(ParameterEntry {
            id: id.clone(),
            value: value.trim().to_string(),
            min: spec.min,
            max: spec.max,
            group: spec.group.clone(),
        });
        buffer[spec.line - 1] = marker::inject(&buffer[spec.line - 1], field, delimiter, id)?;
    }

    buffer.insert(0, format!("{first_line_token} {delimiter}"));
    Ok(AssembledTemplate {
        parameters,
        lines: buffer,
    })
}

fn locate(lines: &[String], spec: &ParameterSpec, source: &str) -> DpestResult<(Span, Span)> {
    let line = lines.get(spec.line.wrapping_sub(1)).ok_or_else(|| {
        DpestError::not_found(
            "FIND.LINE",
            format!(
                "line {} for parameter '{}' is out of range in '{}' ({} lines)",
                spec.line,
                spec.name,
                source,
                lines.len()
            ),
        )
    })?;
    span::compute(line).column(spec.column).ok_or_else(|| {
        DpestError::not_found(
            "FIND.COLUMN",
            format!(
                "column {} for parameter '{}' is out of range on line {} of '{}'",
                spec.column, spec.name, spec.line, source
            ),
        )
    })
}
