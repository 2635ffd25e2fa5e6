//! DSSAT daily output (.OUT) structure: per-treatment blocks introduced by a
//! `*RUN` line, metadata lines (`MODEL`, `EXPERIMENT`, `TREATMENT`), a
//! `@YEAR DOY DAS` header and one data row per simulated day.

use crate::domain::{DpestError, DpestResult};

/// Simulated calendar stamp. `combined()` packs year and day-of-year into
/// the `YYYYDDD` integer the date arithmetic below operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateStamp {
    pub year: i64,
    pub doy: u32,
}

impl DateStamp {
    pub const fn combined(&self) -> i64 {
        self.year * 1000 + self.doy as i64
    }
}

/// Resolves a raw T-file date (either `YYDDD` or `YYYYDDD`) against the
/// simulation's own century. Two-digit years inherit the century of
/// `simulated`; this mirrors how the measured data are encoded and is a
/// known precision limit, not a calendar algorithm.
pub fn resolve_measured_date(raw: i64, simulated: DateStamp) -> i64 {
    if raw >= 1_000_000 {
        return raw;
    }
    let century = simulated.combined() / 100_000;
    century * 100_000 + raw
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentBlock {
    pub number: u32,
    pub name: String,
    pub experiment: String,
    pub crop: String,
    pub model: String,
    /// 0-based line range of the block, `start..end`.
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    lines: Vec<String>,
    blocks: Vec<TreatmentBlock>,
}

pub fn parse(text: &str, source: &str) -> DpestResult<OutputFile> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim_start().starts_with("*RUN"))
        .map(|(index, _)| index)
        .collect();
    if starts.is_empty() {
        return Err(DpestError::not_found(
            "FIND.RUN",
            format!("no '*RUN' treatment blocks found in '{}'", source),
        ));
    }

    let mut blocks = Vec::with_capacity(starts.len());
    for (position, &start) in starts.iter().enumerate() {
        let end = starts.get(position + 1).copied().unwrap_or(lines.len());
        blocks.push(parse_block(&lines, start, end, source)?);
    }

    Ok(OutputFile { lines, blocks })
}

fn parse_block(
    lines: &[String],
    start: usize,
    end: usize,
    source: &str,
) -> DpestResult<TreatmentBlock> {
    let mut number = None;
    let mut name = None;
    let mut experiment = None;
    let mut crop = None;
    let mut model = None;

    for line in &lines[start..end] {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("TREATMENT") {
            let (head, value) = split_metadata(rest);
            number = head.split_whitespace().next().and_then(|token| token.parse().ok());
            name = Some(value);
        } else if let Some(rest) = trimmed.strip_prefix("EXPERIMENT") {
            let (_, value) = split_metadata(rest);
            experiment = value.split_whitespace().next().map(str::to_string);
        } else if let Some(rest) = trimmed.strip_prefix("MODEL") {
            let (_, value) = split_metadata(rest);
            // "WHCER048 - CERES-Wheat": the crop is the last dash-separated
            // segment, the model label the part after the code.
            model = Some(value.clone());
            crop = value
                .rsplit('-')
                .next()
                .map(|segment| segment.trim().to_string());
        }
    }

    let context = |field: &str| {
        DpestError::not_found(
            "FIND.BLOCK_METADATA",
            format!(
                "treatment block at line {} of '{}' is missing its {} line",
                start + 1,
                source,
                field
            ),
        )
    };

    Ok(TreatmentBlock {
        number: number.ok_or_else(|| context("TREATMENT"))?,
        name: name.ok_or_else(|| context("TREATMENT"))?,
        experiment: experiment.ok_or_else(|| context("EXPERIMENT"))?,
        crop: crop.ok_or_else(|| context("MODEL"))?,
        model: model.ok_or_else(|| context("MODEL"))?,
        start,
        end,
    })
}

/// Splits a `HEAD : value` metadata tail into the text before and after the
/// colon, both trimmed.
fn split_metadata(rest: &str) -> (String, String) {
    match rest.split_once(':') {
        Some((head, value)) => (head.trim().to_string(), value.trim().to_string()),
        None => (rest.trim().to_string(), String::new()),
    }
}

impl OutputFile {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn blocks(&self) -> &[TreatmentBlock] {
        &self.blocks
    }

    pub fn block_for_treatment(
        &self,
        treatment: &str,
        source: &str,
    ) -> DpestResult<&TreatmentBlock> {
        self.blocks
            .iter()
            .find(|block| block.name == treatment)
            .ok_or_else(|| {
                DpestError::not_found(
                    "FIND.TREATMENT",
                    format!("treatment '{}' not present in '{}'", treatment, source),
                )
            })
    }

    /// The `@YEAR DOY DAS` header of a block: 0-based line index plus text.
    pub fn header_line(&self, block: &TreatmentBlock, source: &str) -> DpestResult<(usize, &str)> {
        self.lines[block.start..block.end]
            .iter()
            .enumerate()
            .find(|(_, line)| line.trim_start().starts_with("@YEAR"))
            .map(|(offset, line)| (block.start + offset, line.as_str()))
            .ok_or_else(|| {
                DpestError::not_found(
                    "FIND.HEADER",
                    format!(
                        "no '@YEAR DOY DAS' header found for treatment '{}' in '{}'",
                        block.name, source
                    ),
                )
            })
    }

    /// 0-based indexes of the simulated data rows of a block, in file order.
    pub fn data_rows(&self, block: &TreatmentBlock, source: &str) -> DpestResult<Vec<usize>> {
        let (header_index, _) = self.header_line(block, source)?;
        Ok(self.lines[header_index + 1..block.end]
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                line.split_whitespace()
                    .next()
                    .is_some_and(|token| token.chars().all(|character| character.is_ascii_digit()))
            })
            .map(|(offset, _)| header_index + 1 + offset)
            .collect())
    }

    pub fn first_simulated_date(
        &self,
        block: &TreatmentBlock,
        source: &str,
    ) -> DpestResult<DateStamp> {
        let rows = self.data_rows(block, source)?;
        let first = rows.first().ok_or_else(|| {
            DpestError::not_found(
                "FIND.DATA_ROWS",
                format!(
                    "treatment '{}' has no simulated data rows in '{}'",
                    block.name, source
                ),
            )
        })?;
        self.row_date(*first, source)
    }

    pub fn last_simulated_date(
        &self,
        block: &TreatmentBlock,
        source: &str,
    ) -> DpestResult<(usize, DateStamp)> {
        let rows = self.data_rows(block, source)?;
        let last = rows.last().ok_or_else(|| {
            DpestError::not_found(
                "FIND.DATA_ROWS",
                format!(
                    "treatment '{}' has no simulated data rows in '{}'",
                    block.name, source
                ),
            )
        })?;
        Ok((*last, self.row_date(*last, source)?))
    }

    fn row_date(&self, row: usize, source: &str) -> DpestResult<DateStamp> {
        let mut tokens = self.lines[row].split_whitespace();
        let year = tokens.next().and_then(|token| token.parse().ok());
        let doy = tokens.next().and_then(|token| token.parse().ok());
        match (year, doy) {
            (Some(year), Some(doy)) => Ok(DateStamp { year, doy }),
            _ => Err(DpestError::not_found(
                "FIND.ROW_DATE",
                format!(
                    "line {} of '{}' does not start with a year and day-of-year pair",
                    row + 1,
                    source
                ),
            )),
        }
    }
}

/// 1-based positions of `variables` among the header tokens, for `w`-skip
/// emission in instruction files.
pub fn variable_positions(
    header_line: &str,
    variables: &[String],
    source: &str,
) -> DpestResult<Vec<(String, usize)>> {
    let tokens: Vec<&str> = header_line.split_whitespace().collect();
    let mut positions = Vec::with_capacity(variables.len());
    for variable in variables {
        let position = tokens
            .iter()
            .position(|token| *token == variable)
            .ok_or_else(|| {
                DpestError::not_found(
                    "FIND.VARIABLE",
                    format!(
                        "variable '{}' not present in the output header of '{}'",
                        variable, source
                    ),
                )
            })?;
        positions.push((variable.clone(), position + 1));
    }
    positions.sort_by_key(|(_, position)| *position);
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::{DateStamp, parse, resolve_measured_date, variable_positions};

    const OUT_FIXTURE: &str = "\
*SIMULATION OVERVIEW FILE

*RUN   1        : 164.0 KG N/HA IRRIG
 MODEL          : WHCER048 - CERES-Wheat
 EXPERIMENT     : SWSW7501 WH N RESPONSE,SWIFT CURRENT
 TREATMENT  1   : 164.0 KG N/HA IRRIG

@YEAR DOY   DAS   LAID   CWAD   T#AD
 1975 305     1   0.00      0      0
 1975 306     2   0.01      4      1
 1975 307     3   0.02      9      2

*RUN   2        : 82.0 KG N/HA IRRIG
 MODEL          : WHCER048 - CERES-Wheat
 EXPERIMENT     : SWSW7501 WH N RESPONSE,SWIFT CURRENT
 TREATMENT  2   : 82.0 KG N/HA IRRIG

@YEAR DOY   DAS   LAID   CWAD   T#AD
 1975 305     1   0.00      0      0
";

    #[test]
    fn blocks_carry_treatment_and_experiment_metadata() {
        let parsed = parse(OUT_FIXTURE, "PlantGro.OUT").expect("fixture should parse");
        assert_eq!(parsed.blocks().len(), 2);

        let block = parsed
            .block_for_treatment("164.0 KG N/HA IRRIG", "PlantGro.OUT")
            .expect("treatment should exist");
        assert_eq!(block.number, 1);
        assert_eq!(block.experiment, "SWSW7501");
        assert_eq!(block.crop, "Wheat");
        assert_eq!(block.model, "WHCER048 - CERES-Wheat");
    }

    #[test]
    fn unknown_treatments_are_not_found_errors() {
        let parsed = parse(OUT_FIXTURE, "PlantGro.OUT").expect("fixture should parse");
        let error = parsed
            .block_for_treatment("NOT A TREATMENT", "PlantGro.OUT")
            .expect_err("unknown treatment must fail");
        assert_eq!(error.code(), "FIND.TREATMENT");
    }

    #[test]
    fn header_and_simulated_dates_are_located_per_block() {
        let parsed = parse(OUT_FIXTURE, "PlantGro.OUT").expect("fixture should parse");
        let block = parsed
            .block_for_treatment("164.0 KG N/HA IRRIG", "PlantGro.OUT")
            .expect("treatment should exist");

        let (_, header) = parsed
            .header_line(block, "PlantGro.OUT")
            .expect("header should exist");
        assert!(header.starts_with("@YEAR DOY"));

        let first = parsed
            .first_simulated_date(block, "PlantGro.OUT")
            .expect("first date should parse");
        assert_eq!(first, DateStamp { year: 1975, doy: 305 });

        let (row, last) = parsed
            .last_simulated_date(block, "PlantGro.OUT")
            .expect("last date should parse");
        assert_eq!(last.doy, 307);
        assert!(parsed.lines()[row].contains("307"));
    }

    #[test]
    fn two_digit_measured_years_inherit_the_simulated_century() {
        let simulated = DateStamp { year: 1975, doy: 305 };
        assert_eq!(resolve_measured_date(75310, simulated), 1975310);
        assert_eq!(resolve_measured_date(1975310, simulated), 1975310);

        let modern = DateStamp { year: 2022, doy: 102 };
        assert_eq!(resolve_measured_date(22109, modern), 2022109);
    }

    #[test]
    fn variable_positions_are_one_based_header_token_indexes() {
        let header = "@YEAR DOY   DAS   LAID   CWAD   T#AD";
        let positions = variable_positions(
            header,
            &["CWAD".to_string(), "LAID".to_string()],
            "PlantGro.OUT",
        )
        .expect("variables should resolve");
        assert_eq!(
            positions,
            vec![("LAID".to_string(), 4), ("CWAD".to_string(), 5)]
        );

        let error = variable_positions(header, &["GWAD".to_string()], "PlantGro.OUT")
            .expect_err("unknown variable must fail");
        assert_eq!(error.code(), "FIND.VARIABLE");
    }
}
