//! In-place extension of time-series output files. When the T file carries
//! measurements dated after the last simulated day, PEST aborts on the
//! missing rows; this module appends zero-filled rows until the simulated
//! period covers every measured date, preserving the original column
//! widths.

use super::serialization;
use super::timeseries::measured_series;
use crate::common::GeneratorConfig;
use crate::domain::{DpestError, DpestResult};
use crate::tabular::output::{self, DateStamp};
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_YEAR_WIDTH: usize = 5;
pub const DEFAULT_DOY_WIDTH: usize = 4;
pub const DEFAULT_COLUMN_WIDTH: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendRequest {
    pub file_path: PathBuf,
    pub treatment: String,
    pub variables: Vec<String>,
    pub year_width: usize,
    pub doy_width: usize,
    pub column_width: usize,
}

impl ExtendRequest {
    pub fn new(
        file_path: impl Into<PathBuf>,
        treatment: impl Into<String>,
        variables: Vec<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            treatment: treatment.into(),
            variables,
            year_width: DEFAULT_YEAR_WIDTH,
            doy_width: DEFAULT_DOY_WIDTH,
            column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendReport {
    pub rows_added: usize,
    pub output_path: PathBuf,
}

pub fn extend(config: &GeneratorConfig, request: &ExtendRequest) -> DpestResult<ExtendReport> {
    if request.treatment.trim().is_empty() {
        return Err(DpestError::validation(
            "INPUT.TREATMENT",
            "the treatment name must not be empty",
        ));
    }
    if request.variables.is_empty() {
        return Err(DpestError::validation(
            "INPUT.VARIABLES",
            "at least one variable code must be specified, e.g. 'LAID'",
        ));
    }
    let source_label = request.file_path.display().to_string();

    let text = serialization::read_source(&request.file_path, "IO.OUTPUT_READ")?;
    let parsed = output::parse(&text, &source_label)?;
    let block = parsed.block_for_treatment(&request.treatment, &source_label)?;
    let (_, header_line) = parsed.header_line(block, &source_label)?;
    let header_columns = header_line.split_whitespace().count();
    let (last_row, last_date) = parsed.last_simulated_date(block, &source_label)?;

    let series = measured_series(
        config,
        &request.file_path,
        &parsed,
        block,
        &request.variables,
        &source_label,
    )?;
    let last_measured = series
        .by_date
        .keys()
        .next_back()
        .copied()
        .map(|date| output::resolve_measured_date(date, last_date))
        .unwrap_or(0);

    if last_measured <= last_date.combined() {
        info!(output = %source_label, "no extension required");
        return Ok(ExtendReport {
            rows_added: 0,
            output_path: request.file_path.clone(),
        });
    }

    // Day-of-year deltas on the packed YYYYDDD stamps, mirroring how the
    // measured dates are encoded; a known precision limit across year
    // boundaries.
    let rows_to_add = (last_measured - last_date.combined()) as usize;
    let last_das = last_das_value(parsed.lines(), last_row)?;

    let mut new_rows = Vec::with_capacity(rows_to_add);
    for step in 1..=rows_to_add {
        let stamp = DateStamp {
            year: last_date.year,
            doy: last_date.doy + step as u32,
        };
        let mut row = format!(
            "{:>year$}{:>doy$}{:>col$}",
            stamp.year,
            stamp.doy,
            last_das + step as i64,
            year = request.year_width,
            doy = request.doy_width,
            col = request.column_width,
        );
        for _ in 3..header_columns {
            row.push_str(&format!("{:>col$}", 0, col = request.column_width));
        }
        new_rows.push(row);
    }

    let mut lines: Vec<String> = parsed.lines().to_vec();
    lines.splice(last_row + 1..last_row + 1, new_rows);
    serialization::write_text_artifact(&request.file_path, &lines.join("\n"), "IO.OUTPUT_WRITE")?;
    info!(
        output = %source_label,
        rows_added = rows_to_add,
        "time-series output extended"
    );

    Ok(ExtendReport {
        rows_added: rows_to_add,
        output_path: request.file_path.clone(),
    })
}

fn last_das_value(lines: &[String], last_row: usize) -> DpestResult<i64> {
    lines[last_row]
        .split_whitespace()
        .nth(2)
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| {
            DpestError::not_found(
                "FIND.ROW_DATE",
                format!(
                    "simulated row {} does not carry a DAS value",
                    last_row + 1
                ),
            )
        })
}
