//! OVERVIEW.OUT structure: per-run sections (same `*RUN`/metadata framing
//! as the daily outputs) each carrying a `*MAIN GROWTH AND DEVELOPMENT
//! VARIABLES` table of end-of-season variables with simulated and measured
//! columns. Measured `-99` means the A file had no observation.

use super::output;
use crate::domain::{DpestError, DpestResult};

const VARIABLES_SECTION: &str = "*MAIN GROWTH AND DEVELOPMENT VARIABLES";

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewRow {
    pub variable: String,
    pub simulated: f64,
    pub measured: Option<f64>,
    /// Lines between the section header and this row; the `l<n>` advance an
    /// instruction file needs after matching the header.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewRun {
    pub treatment: String,
    pub crop: String,
    pub model: String,
    pub header_line: String,
    pub rows: Vec<OverviewRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewFile {
    runs: Vec<OverviewRun>,
}

pub fn parse(text: &str, source: &str) -> DpestResult<OverviewFile> {
    let parsed = output::parse(text, source)?;
    let lines = parsed.lines();

    let mut runs = Vec::new();
    for block in parsed.blocks() {
        let section = lines[block.start..block.end]
            .iter()
            .position(|line| line.trim_start().starts_with(VARIABLES_SECTION))
            .map(|offset| block.start + offset);
        let Some(section_index) = section else {
            continue;
        };

        let header_index = lines[section_index..block.end]
            .iter()
            .position(|line| line.trim_start().starts_with('@'))
            .map(|offset| section_index + offset)
            .ok_or_else(|| {
                DpestError::not_found(
                    "FIND.HEADER",
                    format!(
                        "no '@' variables header under the growth table of treatment '{}' in '{}'",
                        block.name, source
                    ),
                )
            })?;

        let mut rows = Vec::new();
        for (offset, line) in lines[header_index + 1..block.end].iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with('*') {
                break;
            }
            let Some(row) = parse_row(trimmed, offset + 1) else {
                continue;
            };
            rows.push(row);
        }

        runs.push(OverviewRun {
            treatment: block.name.clone(),
            crop: block.crop.clone(),
            model: block.model.clone(),
            header_line: lines[header_index].clone(),
            rows,
        });
    }

    if runs.is_empty() {
        return Err(DpestError::not_found(
            "FIND.GROWTH_TABLE",
            format!(
                "no '{}' section found in '{}'",
                VARIABLES_SECTION, source
            ),
        ));
    }

    Ok(OverviewFile { runs })
}

fn parse_row(trimmed: &str, position: usize) -> Option<OverviewRow> {
    if trimmed.is_empty() {
        return None;
    }
    let (rest, measured_token) = trimmed.trim_end().rsplit_once(char::is_whitespace)?;
    let (name_part, simulated_token) = rest.trim_end().rsplit_once(char::is_whitespace)?;
    let measured = measured_token.parse::<f64>().ok()?;
    let simulated = simulated_token.parse::<f64>().ok()?;
    let variable = name_part.trim().to_string();
    if variable.is_empty() {
        return None;
    }
    Some(OverviewRow {
        variable,
        simulated,
        measured: (measured != -99.0).then_some(measured),
        position,
    })
}

impl OverviewFile {
    pub fn runs(&self) -> &[OverviewRun] {
        &self.runs
    }

    pub fn run_for_treatment(&self, treatment: &str, source: &str) -> DpestResult<&OverviewRun> {
        self.runs
            .iter()
            .find(|run| run.treatment == treatment)
            .ok_or_else(|| {
                DpestError::not_found(
                    "FIND.TREATMENT",
                    format!(
                        "no overview data found for treatment '{}' in '{}'",
                        treatment, source
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::parse;

    const OVERVIEW_FIXTURE: &str = "\
*SIMULATION OVERVIEW FILE

*RUN   1        : 164.0 KG N/HA IRRIG
 MODEL          : WHCER048 - CERES-Wheat
 EXPERIMENT     : SWSW7501 WH N RESPONSE,SWIFT CURRENT
 TREATMENT  1   : 164.0 KG N/HA IRRIG

*MAIN GROWTH AND DEVELOPMENT VARIABLES

@     VARIABLE                                         SIMULATED     MEASURED
      Emergence (DAP)                                          8            7
      Anthesis (DAP)                                          62          -99
      Maturity (DAP)                                         103          105
      Product wt (kg dm/ha;no loss)                         3412         3520
      Maximum leaf area index                               1.95         2.10
";

    #[test]
    fn runs_expose_their_growth_rows_with_positions() {
        let overview = parse(OVERVIEW_FIXTURE, "OVERVIEW.OUT").expect("fixture should parse");
        let run = overview
            .run_for_treatment("164.0 KG N/HA IRRIG", "OVERVIEW.OUT")
            .expect("treatment should exist");

        assert_eq!(run.crop, "Wheat");
        assert!(run.header_line.contains("SIMULATED"));
        assert_eq!(run.rows.len(), 5);

        let emergence = &run.rows[0];
        assert_eq!(emergence.variable, "Emergence (DAP)");
        assert_eq!(emergence.simulated, 8.0);
        assert_eq!(emergence.measured, Some(7.0));
        assert_eq!(emergence.position, 1);
    }

    #[test]
    fn missing_measurements_are_none() {
        let overview = parse(OVERVIEW_FIXTURE, "OVERVIEW.OUT").expect("fixture should parse");
        let run = overview
            .run_for_treatment("164.0 KG N/HA IRRIG", "OVERVIEW.OUT")
            .expect("treatment should exist");
        let anthesis = run
            .rows
            .iter()
            .find(|row| row.variable == "Anthesis (DAP)")
            .expect("row should exist");
        assert_eq!(anthesis.measured, None);
    }

    #[test]
    fn unknown_treatments_are_not_found_errors() {
        let overview = parse(OVERVIEW_FIXTURE, "OVERVIEW.OUT").expect("fixture should parse");
        assert_eq!(
            overview
                .run_for_treatment("NONE", "OVERVIEW.OUT")
                .unwrap_err()
                .code(),
            "FIND.TREATMENT"
        );
    }

    #[test]
    fn files_without_growth_tables_are_rejected() {
        let text = "*RUN 1 : X\n MODEL : M - Crop\n EXPERIMENT : E\n TREATMENT 1 : X\n";
        assert_eq!(
            parse(text, "OVERVIEW.OUT").unwrap_err().code(),
            "FIND.GROWTH_TABLE"
        );
    }
}
