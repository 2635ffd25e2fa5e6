//! Scalar tuning-value setters for an existing PEST control file.
//!
//! Every setter validates its value range, then rewrites a single
//! whitespace-delimited field at the fixed (line, position) slot the PEST
//! control-data layout assigns to it. The file is rewritten atomically in
//! memory: either the named slot exists and is replaced, or the file is
//! left untouched.

use super::super::serialization;
use crate::domain::{DpestError, DpestResult};
use std::path::Path;

/// Control-data line indexes (0-based) per the PEST .PST layout.
mod slot {
    pub const MODE_LINE: usize = 2;
    pub const LAMBDA_LINE: usize = 5;
    pub const PARMAX_LINE: usize = 6;
    pub const SWH_LINE: usize = 7;
    pub const ITERATION_LINE: usize = 8;
}

pub fn rstfle(path: &Path, value: &str) -> DpestResult<()> {
    let allowed = ["restart", "norestart"];
    if !allowed.contains(&value) {
        return Err(DpestError::validation(
            "INPUT.RSTFLE",
            format!("RSTFLE must be one of {:?}, got '{}'", allowed, value),
        ));
    }
    update_field(path, slot::MODE_LINE, 0, value, "RSTFLE")
}

pub fn pestmode(path: &Path, value: &str) -> DpestResult<()> {
    let allowed = ["estimation", "prediction", "regularisation"];
    if !allowed.contains(&value) {
        return Err(DpestError::validation(
            "INPUT.PESTMODE",
            format!("PESTMODE must be one of {:?}, got '{}'", allowed, value),
        ));
    }
    update_field(path, slot::MODE_LINE, 1, value, "PESTMODE")
}

pub fn rlambda1(path: &Path, value: f64) -> DpestResult<()> {
    if value < 0.0 {
        return Err(DpestError::validation(
            "INPUT.RLAMBDA1",
            format!("RLAMBDA1 must be non-negative, got {}", value),
        ));
    }
    update_field(path, slot::LAMBDA_LINE, 0, &value.to_string(), "RLAMBDA1")
}

pub fn rlamfac(path: &Path, value: f64) -> DpestResult<()> {
    if value == 0.0 {
        return Err(DpestError::validation(
            "INPUT.RLAMFAC",
            "RLAMFAC must not be zero",
        ));
    }
    update_field(path, slot::LAMBDA_LINE, 1, &value.to_string(), "RLAMFAC")
}

pub fn phiratsuf(path: &Path, value: f64) -> DpestResult<()> {
    require_unit_interval(value, "PHIRATSUF", "INPUT.PHIRATSUF")?;
    update_field(path, slot::LAMBDA_LINE, 2, &value.to_string(), "PHIRATSUF")
}

pub fn phiredlam(path: &Path, value: f64) -> DpestResult<()> {
    require_unit_interval(value, "PHIREDLAM", "INPUT.PHIREDLAM")?;
    update_field(path, slot::LAMBDA_LINE, 3, &value.to_string(), "PHIREDLAM")
}

pub fn numlam(path: &Path, value: i64) -> DpestResult<()> {
    if value == 0 {
        return Err(DpestError::validation(
            "INPUT.NUMLAM",
            "NUMLAM cannot be zero (negative values are reserved for Parallel PEST)",
        ));
    }
    update_field(path, slot::LAMBDA_LINE, 4, &value.to_string(), "NUMLAM")
}

pub fn relparmax(path: &Path, value: f64) -> DpestResult<()> {
    if value <= 0.0 {
        return Err(DpestError::validation(
            "INPUT.RELPARMAX",
            format!("RELPARMAX must be positive, got {}", value),
        ));
    }
    update_field(path, slot::PARMAX_LINE, 0, &value.to_string(), "RELPARMAX")
}

pub fn facparmax(path: &Path, value: f64) -> DpestResult<()> {
    if value <= 1.0 {
        return Err(DpestError::validation(
            "INPUT.FACPARMAX",
            format!("FACPARMAX must be greater than 1.0, got {}", value),
        ));
    }
    update_field(path, slot::PARMAX_LINE, 1, &value.to_string(), "FACPARMAX")
}

pub fn facorig(path: &Path, value: f64) -> DpestResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DpestError::validation(
            "INPUT.FACORIG",
            format!("FACORIG must be between 0.0 and 1.0, got {}", value),
        ));
    }
    update_field(path, slot::PARMAX_LINE, 2, &value.to_string(), "FACORIG")
}

pub fn phiredswh(path: &Path, value: f64) -> DpestResult<()> {
    require_unit_interval(value, "PHIREDSWH", "INPUT.PHIREDSWH")?;
    update_field(path, slot::SWH_LINE, 0, &value.to_string(), "PHIREDSWH")
}

pub fn noptmax(path: &Path, value: i64) -> DpestResult<()> {
    if value < -2 {
        return Err(DpestError::validation(
            "INPUT.NOPTMAX",
            format!("NOPTMAX must be -2, -1, 0 or a positive iteration count, got {}", value),
        ));
    }
    update_field(path, slot::ITERATION_LINE, 0, &value.to_string(), "NOPTMAX")
}

pub fn phiredstp(path: &Path, value: f64) -> DpestResult<()> {
    require_positive(value, "PHIREDSTP", "INPUT.PHIREDSTP")?;
    update_field(path, slot::ITERATION_LINE, 1, &value.to_string(), "PHIREDSTP")
}

pub fn nphistp(path: &Path, value: i64) -> DpestResult<()> {
    require_positive(value as f64, "NPHISTP", "INPUT.NPHISTP")?;
    update_field(path, slot::ITERATION_LINE, 2, &value.to_string(), "NPHISTP")
}

pub fn nphinored(path: &Path, value: i64) -> DpestResult<()> {
    require_positive(value as f64, "NPHINORED", "INPUT.NPHINORED")?;
    update_field(path, slot::ITERATION_LINE, 3, &value.to_string(), "NPHINORED")
}

pub fn relparstp(path: &Path, value: f64) -> DpestResult<()> {
    require_positive(value, "RELPARSTP", "INPUT.RELPARSTP")?;
    update_field(path, slot::ITERATION_LINE, 4, &value.to_string(), "RELPARSTP")
}

pub fn nrelpar(path: &Path, value: i64) -> DpestResult<()> {
    require_positive(value as f64, "NRELPAR", "INPUT.NRELPAR")?;
    update_field(path, slot::ITERATION_LINE, 5, &value.to_string(), "NRELPAR")
}

/// Inserts or replaces a `* singular value decomposition` section directly
/// after the control-data section.
pub fn svd(path: &Path, maxsing: u32, eigthresh: f64, eigwrite: u8) -> DpestResult<()> {
    if !(0.0..=1.0).contains(&eigthresh) {
        return Err(DpestError::validation(
            "INPUT.SVD_EIGTHRESH",
            format!("EIGTHRESH must be between 0.0 and 1.0, got {}", eigthresh),
        ));
    }

    let mut lines = read_lines(path)?;
    let section = ["* singular value decomposition".to_string(),
        "1".to_string(),
        format!("{} {}", maxsing, eigthresh),
        format!("{}", eigwrite)];

    if let Some(existing) = lines
        .iter()
        .position(|line| line.trim() == "* singular value decomposition")
    {
        let end = (existing + 4).min(lines.len());
        lines.splice(existing..end, section);
    } else {
        let insert_at = lines
            .iter()
            .position(|line| line.trim_start().starts_with('*') && line.contains("parameter groups"))
            .unwrap_or(lines.len());
        lines.splice(insert_at..insert_at, section);
    }

    serialization::write_text_artifact(path, &lines.join("\n"), "IO.PST_WRITE")
}

fn require_unit_interval(value: f64, label: &str, code: &'static str) -> DpestResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DpestError::validation(
            code,
            format!("{} must be between 0.0 and 1.0, got {}", label, value),
        ));
    }
    Ok(())
}

fn require_positive(value: f64, label: &str, code: &'static str) -> DpestResult<()> {
    if value <= 0.0 {
        return Err(DpestError::validation(
            code,
            format!("{} must be greater than zero, got {}", label, value),
        ));
    }
    Ok(())
}

fn read_lines(path: &Path) -> DpestResult<Vec<String>> {
    let text = serialization::read_source(path, "IO.PST_READ")?;
    Ok(text.lines().map(str::to_string).collect())
}

fn update_field(
    path: &Path,
    line_index: usize,
    value_index: usize,
    new_value: &str,
    label: &str,
) -> DpestResult<()> {
    let mut lines = read_lines(path)?;
    if lines.len() <= line_index {
        return Err(DpestError::validation(
            "INPUT.PST_LINES",
            format!(
                "'{}' has only {} lines; {} lives on line {}",
                path.display(),
                lines.len(),
                label,
                line_index + 1
            ),
        ));
    }

    let mut fields: Vec<String> = lines[line_index]
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if fields.len() <= value_index {
        return Err(DpestError::validation(
            "INPUT.PST_FIELD",
            format!(
                "{} position not found on line {} of '{}'",
                label,
                line_index + 1,
                path.display()
            ),
        ));
    }
    fields[value_index] = new_value.to_string();
    lines[line_index] = fields.join(" ");

    serialization::write_text_artifact(path, &lines.join("\n"), "IO.PST_WRITE")
}
