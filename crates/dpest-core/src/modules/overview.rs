//! Instruction-file generation for OVERVIEW.OUT: one `l<skip>` line per
//! measured end-of-season variable, addressed by a primary-marker search on
//! the variable's own row text.

use super::{helpers, serialization};
use crate::common::GeneratorConfig;
use crate::domain::{
    DpestError, DpestResult, InstructionArtifact, MarkerPair, ObservationRecord, ObservationTable,
    Suffix,
};
use crate::tabular::overview;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::info;

/// Observation group used when neither the caller nor the configuration
/// classifies a variable.
const FALLBACK_GROUP: &str = "unclassified";

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewRequest {
    pub file_path: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub treatment: String,
    /// Restricts the instruction file to these variables; `None` keeps every
    /// measured row.
    pub variables: Option<Vec<String>>,
    /// Caller-supplied classification; falls back to the configured table.
    pub classification: Option<BTreeMap<String, String>>,
    pub suffix: Option<Suffix>,
    pub markers: MarkerPair,
}

impl OverviewRequest {
    pub fn new(file_path: impl Into<PathBuf>, treatment: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            output_dir: None,
            treatment: treatment.into(),
            variables: None,
            classification: None,
            suffix: None,
            markers: MarkerPair::default(),
        }
    }
}

pub fn overview(
    config: &GeneratorConfig,
    request: &OverviewRequest,
) -> DpestResult<InstructionArtifact> {
    if request.treatment.trim().is_empty() {
        return Err(DpestError::validation(
            "INPUT.TREATMENT",
            "the treatment name must not be empty",
        ));
    }
    let stem = helpers::validated_stem(&request.file_path, &config.output_extension)?;
    let source_label = request.file_path.display().to_string();

    let text = serialization::read_source(&request.file_path, "IO.OVERVIEW_READ")?;
    let parsed = overview::parse(&text, &source_label)?;
    let run = parsed.run_for_treatment(&request.treatment, &source_label)?;

    let classification = request
        .classification
        .as_ref()
        .unwrap_or(&config.overview_classification);

    let rows: Vec<&overview::OverviewRow> = run
        .rows
        .iter()
        .filter(|row| row.measured.is_some())
        .filter(|row| match &request.variables {
            Some(wanted) => wanted.iter().any(|variable| *variable == row.variable),
            None => true,
        })
        .collect();
    if rows.is_empty() {
        return Err(DpestError::not_found(
            "FIND.OBSERVATIONS",
            format!(
                "no measured overview values for treatment '{}' in '{}'",
                request.treatment, source_label
            ),
        ));
    }

    let mrk = request.markers.primary();
    let smk = request.markers.secondary();
    let mut used_names = BTreeSet::new();
    let mut observations = ObservationTable::default();
    let mut body = String::new();
    let mut previous_position = 0;
    for row in rows {
        let skip = row.position - previous_position;
        previous_position = row.position;

        let base = helpers::sanitize_variable_name(&row.variable, config.max_observation_name);
        let suffixed = helpers::apply_suffix(
            &base,
            request.suffix.as_ref(),
            config.max_observation_name,
        );
        let name = helpers::unique_observation_name(
            &suffixed,
            config.max_observation_name,
            &mut used_names,
        );
        let group = classification
            .get(&row.variable)
            .cloned()
            .unwrap_or_else(|| FALLBACK_GROUP.to_string());

        body.push_str(&format!(
            "l{skip} {mrk}{variable}{mrk} {smk}{name}{smk}\n",
            variable = row.variable
        ));
        let measured = row
            .measured
            .unwrap_or_default();
        observations.push(ObservationRecord {
            variable_name: name,
            value_measured: measured,
            group,
        });
    }

    let header_text = run.header_line.trim_start().trim_start_matches('@').trim();
    let content = format!(
        "{first_line} {mrk}\n{mrk}{treatment}{mrk}\n{mrk}{header}{mrk}\n{body}",
        first_line = config.instruction_first_line,
        treatment = request.treatment,
        header = header_text,
    );

    let output_dir = helpers::resolve_output_dir(request.output_dir.as_deref(), &request.file_path)?;
    let tag = request
        .suffix
        .as_ref()
        .map(Suffix::tag)
        .unwrap_or_default();
    let output_path = output_dir.join(format!("{stem}{tag}.{}", config.instruction_extension));
    serialization::write_text_artifact(&output_path, &content, "IO.INSTRUCTION_WRITE")?;
    info!(
        instruction = %output_path.display(),
        observations = observations.len(),
        "overview instruction file written"
    );

    Ok(InstructionArtifact {
        observations,
        output_path,
    })
}
