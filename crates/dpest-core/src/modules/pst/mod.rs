//! PEST control file (.PST) assembly. The control-data section follows the
//! fixed PEST line layout, so the scalar setters in [`options`] can address
//! each tuning value by (line, position) without reparsing section
//! boundaries.

pub mod options;

use super::serialization;
use crate::domain::{DpestError, DpestResult, GeneratedParameterSet, ObservationTable};
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_PST_FILENAME: &str = "PEST_CONTROL.pst";

#[derive(Debug, Clone, PartialEq)]
pub struct ControlFileRequest {
    pub parameter_sets: Vec<GeneratedParameterSet>,
    pub observations: Vec<ObservationTable>,
    pub model_command_line: String,
    /// Template/instruction paths paired with the model files they address.
    pub io_pairs: Vec<(PathBuf, PathBuf)>,
    pub output_dir: Option<PathBuf>,
    pub filename: Option<String>,
}

pub fn pst(request: &ControlFileRequest) -> DpestResult<PathBuf> {
    let parameter_count: usize = request.parameter_sets.iter().map(|set| set.len()).sum();
    if parameter_count == 0 {
        return Err(DpestError::validation(
            "INPUT.PST_PARAMETERS",
            "a control file needs at least one calibratable parameter",
        ));
    }
    let observation_count: usize = request.observations.iter().map(|table| table.len()).sum();
    if observation_count == 0 {
        return Err(DpestError::validation(
            "INPUT.PST_OBSERVATIONS",
            "a control file needs at least one observation",
        ));
    }
    if request.model_command_line.trim().is_empty() {
        return Err(DpestError::validation(
            "INPUT.PST_COMMAND",
            "the model command line must not be empty",
        ));
    }
    if request.io_pairs.is_empty() {
        return Err(DpestError::validation(
            "INPUT.PST_IO_PAIRS",
            "at least one template/instruction file pair must be supplied",
        ));
    }

    let parameter_groups = collect_parameter_groups(&request.parameter_sets);
    let observation_groups = collect_observation_groups(&request.observations);
    let template_count = count_extension(&request.io_pairs, "tpl");
    let instruction_count = count_extension(&request.io_pairs, "ins");

    let mut lines: Vec<String> = Vec::new();
    lines.push("pcf".to_string());
    lines.push("* control data".to_string());
    lines.push("restart estimation".to_string());
    lines.push(format!(
        "{} {} {} 0 {}",
        parameter_count,
        observation_count,
        parameter_groups.len(),
        observation_groups.len()
    ));
    lines.push(format!("{} {} single point", template_count, instruction_count));
    lines.push("5.0 2.0 0.3 0.03 10".to_string());
    lines.push("5.0 5.0 0.001".to_string());
    lines.push("0.1".to_string());
    lines.push("30 0.005 4 4 0.005 4".to_string());
    lines.push("1 1 1".to_string());

    lines.push("* parameter groups".to_string());
    for group in &parameter_groups {
        lines.push(format!("{group} relative 0.01 0.0 switch 2.0 parabolic"));
    }

    lines.push("* parameter data".to_string());
    for set in &request.parameter_sets {
        for entry in set.entries() {
            lines.push(format!(
                "{} none relative {} {} {} {} 1.0 0.0 1",
                entry.id, entry.value, entry.min, entry.max, entry.group
            ));
        }
    }

    lines.push("* observation groups".to_string());
    for group in &observation_groups {
        lines.push(group.clone());
    }

    lines.push("* observation data".to_string());
    for table in &request.observations {
        for record in table.records() {
            lines.push(format!(
                "{} {} 1.0 {}",
                record.variable_name, record.value_measured, record.group
            ));
        }
    }

    lines.push("* model command line".to_string());
    lines.push(request.model_command_line.clone());

    lines.push("* model input/output".to_string());
    for (artifact, model_file) in &request.io_pairs {
        lines.push(format!("{} {}", artifact.display(), model_file.display()));
    }

    let output_dir = request
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let filename = request
        .filename
        .as_deref()
        .unwrap_or(DEFAULT_PST_FILENAME);
    let output_path = output_dir.join(filename);
    serialization::write_text_artifact(&output_path, &lines.join("\n"), "IO.PST_WRITE")?;
    info!(
        control_file = %output_path.display(),
        parameters = parameter_count,
        observations = observation_count,
        "control file written"
    );

    Ok(output_path)
}

fn collect_parameter_groups(sets: &[GeneratedParameterSet]) -> Vec<String> {
    let mut groups = Vec::new();
    for set in sets {
        for (group, _) in set.grouped() {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    }
    groups
}

fn collect_observation_groups(tables: &[ObservationTable]) -> Vec<String> {
    let mut groups = Vec::new();
    for table in tables {
        for record in table.records() {
            if !groups.contains(&record.group) {
                groups.push(record.group.clone());
            }
        }
    }
    groups
}

fn count_extension(pairs: &[(PathBuf, PathBuf)], extension: &str) -> usize {
    pairs
        .iter()
        .filter(|(artifact, _)| {
            artifact
                .extension()
                .and_then(|actual| actual.to_str())
                .is_some_and(|actual| actual.eq_ignore_ascii_case(extension))
        })
        .count()
}
