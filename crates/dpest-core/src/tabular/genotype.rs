//! DSSAT genotype file (.CUL/.ECO) structure: a `@`-prefixed header line
//! naming one column per coefficient, followed by one data row per
//! cultivar/ecotype entry. Columns carry no declared widths, so parameter
//! cells are resolved by aligning header token spans with data row fields.

use crate::domain::{DpestError, DpestResult};
use crate::layout::span;

#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeTable {
    lines: Vec<String>,
    header_index: usize,
}

pub fn parse(text: &str, source: &str) -> DpestResult<GenotypeTable> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let header_index = lines
        .iter()
        .position(|line| line.trim_start().starts_with('@'))
        .ok_or_else(|| {
            DpestError::not_found(
                "FIND.HEADER",
                format!("no '@' header line found in '{}'", source),
            )
        })?;
    Ok(GenotypeTable {
        lines,
        header_index,
    })
}

impl GenotypeTable {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn header_line(&self) -> &str {
        &self.lines[self.header_index]
    }

    /// 0-based index of the first data row mentioning `label` (the
    /// cultivar/ecotype name or accession code). Comment lines (`!`, `*`)
    /// and blank lines are skipped.
    pub fn locate_entry(&self, label: &str, source: &str) -> DpestResult<usize> {
        self.lines
            .iter()
            .enumerate()
            .skip(self.header_index + 1)
            .find(|(_, line)| {
                let trimmed = line.trim_start();
                !trimmed.is_empty()
                    && !trimmed.starts_with('!')
                    && !trimmed.starts_with('*')
                    && line.contains(label)
            })
            .map(|(index, _)| index)
            .ok_or_else(|| {
                DpestError::not_found(
                    "FIND.ENTRY",
                    format!("the cultivar or ecotype '{}' was not found in '{}'", label, source),
                )
            })
    }

    /// Resolves `parameter` to the (1-based line, 1-based column) address of
    /// its value on the data row at `row_index`.
    ///
    /// The header token matching `parameter` is located first; the data row
    /// token whose field shares the most columns with that header token is
    /// the value cell. Rows whose fields do not reach the header span at all
    /// are reported as missing rather than guessed at.
    pub fn locate_parameter(
        &self,
        row_index: usize,
        parameter: &str,
        source: &str,
    ) -> DpestResult<(usize, usize)> {
        let header = span::compute(self.header_line());
        let header_chars: Vec<char> = self.header_line().chars().collect();
        let header_span = header
            .tokens()
            .iter()
            .find(|token| {
                let text: String = header_chars[token.start..token.end].iter().collect();
                let text = text.trim_start_matches('@');
                text.eq_ignore_ascii_case(parameter)
            })
            .copied()
            .ok_or_else(|| {
                DpestError::not_found(
                    "FIND.PARAMETER",
                    format!(
                        "parameter '{}' does not exist in the header line of '{}'",
                        parameter, source
                    ),
                )
            })?;

        let row = span::compute(&self.lines[row_index]);
        let mut best: Option<(usize, usize)> = None;
        for (index, field) in row.fields().iter().enumerate() {
            let overlap = field.overlap_width(&header_span);
            if overlap > 0 && best.is_none_or(|(_, width)| overlap > width) {
                best = Some((index, overlap));
            }
        }
        let (column_index, _) = best.ok_or_else(|| {
            DpestError::not_found(
                "FIND.COLUMN",
                format!(
                    "no value aligned under header column '{}' on line {} of '{}'",
                    parameter,
                    row_index + 1,
                    source
                ),
            )
        })?;

        Ok((row_index + 1, column_index + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::parse;

    const CUL_FIXTURE: &str = "\
*WHEAT CULTIVAR COEFFICIENTS: WHCER048 MODEL

! COEFF   DEFINITION
! P1V     Days at optimum vernalizing temperature
@VAR#  VAR-NAME........  EXP#   ECO#   P1V   P1D    P5    G1    G2    G3 PHINT
IB0488 NEWTON               . CAWH01     5    75   450    30    35   1.3    95
IB1500 MANITOU              . CAWH01   1.5   3.6   450    25    30   1.0    86
";

    #[test]
    fn header_and_entry_rows_are_located() {
        let table = parse(CUL_FIXTURE, "WHCER048.CUL").expect("fixture should parse");
        assert!(table.header_line().starts_with("@VAR#"));
        let row = table
            .locate_entry("MANITOU", "WHCER048.CUL")
            .expect("entry should exist");
        assert!(table.lines()[row].contains("MANITOU"));
    }

    #[test]
    fn comment_lines_never_match_an_entry() {
        let table = parse(CUL_FIXTURE, "WHCER048.CUL").expect("fixture should parse");
        // "P1V" appears in a comment; the search starts below the header.
        assert!(table.locate_entry("vernalizing", "WHCER048.CUL").is_err());
    }

    #[test]
    fn parameter_columns_align_with_header_tokens() {
        let table = parse(CUL_FIXTURE, "WHCER048.CUL").expect("fixture should parse");
        let row = table
            .locate_entry("MANITOU", "WHCER048.CUL")
            .expect("entry should exist");

        let (line, column) = table
            .locate_parameter(row, "P1D", "WHCER048.CUL")
            .expect("parameter should resolve");
        assert_eq!(line, row + 1);
        // @VAR#=1, VAR-NAME=2, EXP#=3, ECO#=4, P1V=5, P1D=6.
        assert_eq!(column, 6);
    }

    #[test]
    fn unknown_headers_and_labels_are_not_found_errors() {
        let table = parse(CUL_FIXTURE, "WHCER048.CUL").expect("fixture should parse");
        let row = table
            .locate_entry("NEWTON", "WHCER048.CUL")
            .expect("entry should exist");

        let missing_parameter = table
            .locate_parameter(row, "INVALID_PARAM", "WHCER048.CUL")
            .expect_err("unknown header token must fail");
        assert_eq!(missing_parameter.code(), "FIND.PARAMETER");

        let missing_entry = table
            .locate_entry("INVALID", "WHCER048.CUL")
            .expect_err("unknown cultivar must fail");
        assert_eq!(missing_entry.code(), "FIND.ENTRY");
    }

    #[test]
    fn files_without_headers_are_rejected() {
        assert_eq!(
            parse("no header here\n", "BAD.CUL").unwrap_err().code(),
            "FIND.HEADER"
        );
    }
}
