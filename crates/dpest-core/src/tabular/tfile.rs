//! DSSAT T files (`<EXPCODE>.<CROPCODE>T`): measured observation values
//! keyed by treatment number and date. A file may hold several `@TRNO`
//! header blocks, each with its own variable columns; `-99` cells are the
//! DSSAT missing-value sentinel and are dropped.

use crate::domain::{DpestError, DpestResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct TFile {
    records: Vec<TRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TRecord {
    pub trno: u32,
    pub date: i64,
    pub values: BTreeMap<String, f64>,
}

pub fn parse(text: &str, source: &str) -> DpestResult<TFile> {
    let mut header: Option<Vec<String>> = None;
    let mut records = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('*') || trimmed.starts_with('!') {
            continue;
        }
        if trimmed.starts_with('@') {
            header = Some(
                trimmed
                    .trim_start_matches('@')
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
            );
            continue;
        }

        let Some(columns) = header.as_ref() else {
            continue;
        };
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < 2 {
            continue;
        }

        let mut trno = None;
        let mut date = None;
        let mut values = BTreeMap::new();
        for (column, token) in columns.iter().zip(&tokens) {
            match column.as_str() {
                "TRNO" => trno = token.parse::<u32>().ok(),
                "DATE" => date = token.parse::<i64>().ok(),
                _ => {
                    if let Ok(value) = token.parse::<f64>()
                        && value != -99.0
                    {
                        values.insert(column.clone(), value);
                    }
                }
            }
        }

        if let (Some(trno), Some(date)) = (trno, date) {
            records.push(TRecord { trno, date, values });
        }
    }

    if records.is_empty() {
        return Err(DpestError::not_found(
            "FIND.TFILE_RECORDS",
            format!("no measured observation rows found in '{}'", source),
        ));
    }

    Ok(TFile { records })
}

impl TFile {
    pub fn records(&self) -> &[TRecord] {
        &self.records
    }

    /// Measured values for one treatment, restricted to `variables`:
    /// date (raw, as encoded in the file) to variable to value, date-sorted.
    pub fn measurements(
        &self,
        trno: u32,
        variables: &[String],
    ) -> BTreeMap<i64, BTreeMap<String, f64>> {
        let mut by_date: BTreeMap<i64, BTreeMap<String, f64>> = BTreeMap::new();
        for record in self.records.iter().filter(|record| record.trno == trno) {
            for variable in variables {
                if let Some(value) = record.values.get(variable) {
                    by_date
                        .entry(record.date)
                        .or_default()
                        .insert(variable.clone(), *value);
                }
            }
        }
        by_date
    }
}

#[cfg(test)]
mod tests {
    use super::parse;

    const TFILE_FIXTURE: &str = "\
*EXP.DATA (T): SWSW7501WH N RESPONSE,SWIFT CURRENT

! Measured wheat growth data
@TRNO  DATE   LAID   CWAD   T#AD
    1 75310    0.5    210    105
    1 75330    1.2   1150    240
    1 75350    -99   3400    312
    2 75310    0.4    180     98
";

    #[test]
    fn records_are_keyed_by_treatment_and_date() {
        let tfile = parse(TFILE_FIXTURE, "SWSW7501.WHT").expect("fixture should parse");
        assert_eq!(tfile.records().len(), 4);

        let measured = tfile.measurements(1, &["LAID".to_string(), "CWAD".to_string()]);
        assert_eq!(measured.len(), 3);
        assert_eq!(measured[&75310]["LAID"], 0.5);
        assert_eq!(measured[&75330]["CWAD"], 1150.0);
    }

    #[test]
    fn missing_value_sentinels_are_dropped() {
        let tfile = parse(TFILE_FIXTURE, "SWSW7501.WHT").expect("fixture should parse");
        let measured = tfile.measurements(1, &["LAID".to_string()]);
        // LAID is -99 on day 75350, so that date carries no LAID value.
        assert!(!measured.contains_key(&75350));
    }

    #[test]
    fn treatments_are_filtered_by_number() {
        let tfile = parse(TFILE_FIXTURE, "SWSW7501.WHT").expect("fixture should parse");
        let measured = tfile.measurements(2, &["T#AD".to_string()]);
        assert_eq!(measured.len(), 1);
        assert_eq!(measured[&75310]["T#AD"], 98.0);
    }

    #[test]
    fn files_without_data_rows_are_rejected() {
        let error = parse("*EXP.DATA\n@TRNO DATE LAID\n", "EMPTY.WHT")
            .expect_err("empty T file must fail");
        assert_eq!(error.code(), "FIND.TFILE_RECORDS");
    }
}
