//! Instruction-file generation for daily time-series outputs (PlantGro.OUT
//! and friends). Simulated values are addressed by line offset from the
//! `@YEAR DOY DAS` header plus `w` column skips; measured values come from
//! the experiment's T file.

use super::{helpers, serialization};
use crate::common::GeneratorConfig;
use crate::domain::{
    DpestError, DpestResult, InstructionArtifact, MarkerPair, ObservationRecord, ObservationTable,
    Suffix,
};
use crate::tabular::output::{self, DateStamp};
use crate::tabular::tfile;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::info;

const FALLBACK_GROUP: &str = "unclassified";

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRequest {
    pub file_path: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub treatment: String,
    /// T-file variable codes to extract (also present in the .OUT header).
    pub variables: Vec<String>,
    pub classification: Option<BTreeMap<String, String>>,
    pub suffix: Option<Suffix>,
    pub markers: MarkerPair,
}

impl TimeSeriesRequest {
    pub fn new(
        file_path: impl Into<PathBuf>,
        treatment: impl Into<String>,
        variables: Vec<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            output_dir: None,
            treatment: treatment.into(),
            variables,
            classification: None,
            suffix: None,
            markers: MarkerPair::default(),
        }
    }
}

/// Measured observations keyed by date for one treatment, resolved through
/// the companion T file (`<EXPCODE>.<CROPCODE>T` beside the .OUT file).
pub(crate) struct MeasuredSeries {
    pub(crate) by_date: BTreeMap<i64, BTreeMap<String, f64>>,
    pub(crate) first_simulated: DateStamp,
}

pub(crate) fn measured_series(
    config: &GeneratorConfig,
    out_path: &Path,
    parsed: &output::OutputFile,
    block: &output::TreatmentBlock,
    variables: &[String],
    source_label: &str,
) -> DpestResult<MeasuredSeries> {
    let crop_code = config.crop_code_for(&block.crop)?;
    let t_file_name = format!("{}.{}T", block.experiment, crop_code);
    let t_file_path = out_path
        .parent()
        .map(|parent| parent.join(&t_file_name))
        .unwrap_or_else(|| PathBuf::from(&t_file_name));

    let t_text = serialization::read_source(&t_file_path, "IO.TFILE_READ")?;
    let t_parsed = tfile::parse(&t_text, &t_file_path.display().to_string())?;
    let by_date = t_parsed.measurements(block.number, variables);
    if by_date.is_empty() {
        return Err(DpestError::not_found(
            "FIND.OBSERVATIONS",
            format!(
                "no measured values for treatment '{}' and variables {:?} in '{}'",
                block.name, variables, t_file_name
            ),
        ));
    }

    let first_simulated = parsed.first_simulated_date(block, source_label)?;
    Ok(MeasuredSeries {
        by_date,
        first_simulated,
    })
}

/// Day offset of a measured date from the first simulated row, as a 1-based
/// `l<n>` advance from the header line.
pub(crate) fn row_offset(date: i64, first_simulated: DateStamp) -> DpestResult<i64> {
    let resolved = output::resolve_measured_date(date, first_simulated);
    let offset = resolved - first_simulated.combined() + 1;
    if offset < 1 {
        return Err(DpestError::validation(
            "INPUT.OBSERVATION_DATE",
            format!(
                "measured date {} precedes the first simulated day {}",
                date,
                first_simulated.combined()
            ),
        ));
    }
    Ok(offset)
}

pub fn ts(config: &GeneratorConfig, request: &TimeSeriesRequest) -> DpestResult<InstructionArtifact> {
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
    let stem = helpers::validated_stem(&request.file_path, &config.output_extension)?;
    let source_label = request.file_path.display().to_string();

    let text = serialization::read_source(&request.file_path, "IO.OUTPUT_READ")?;
    let parsed = output::parse(&text, &source_label)?;
    let block = parsed.block_for_treatment(&request.treatment, &source_label)?;
    let (_, header_line) = parsed.header_line(block, &source_label)?;
    let header_line = header_line.to_string();

    let series = measured_series(
        config,
        &request.file_path,
        &parsed,
        block,
        &request.variables,
        &source_label,
    )?;

    let classification = request
        .classification
        .as_ref()
        .unwrap_or(&config.timeseries_classification);
    let smk = request.markers.secondary();
    let mrk = request.markers.primary();
    let tag = request.suffix.as_ref().map(Suffix::tag).unwrap_or_default();

    let mut used_names = BTreeSet::new();
    let mut observations = ObservationTable::default();
    let mut body = String::new();
    let mut previous_offset = 0;
    for (date, values) in &series.by_date {
        let offset = row_offset(*date, series.first_simulated)?;
        let advance = offset - previous_offset;
        if advance < 1 {
            return Err(DpestError::validation(
                "INPUT.OBSERVATION_DATE",
                format!(
                    "measured date {} does not advance past the previous observation row",
                    date
                ),
            ));
        }
        previous_offset = offset;

        let present: Vec<String> = values.keys().cloned().collect();
        let positions = output::variable_positions(&header_line, &present, &source_label)?;

        let mut line = format!("l{advance}");
        let mut cursor = 1;
        for (variable, position) in positions {
            for _ in cursor..position {
                line.push_str(" w");
            }
            cursor = position + 1;

            let name = helpers::unique_observation_name(
                &format!("{variable}_{date}{tag}"),
                config.max_observation_name,
                &mut used_names,
            );
            line.push_str(&format!(" {smk}{name}{smk}"));
            let group = classification
                .get(&variable)
                .cloned()
                .unwrap_or_else(|| FALLBACK_GROUP.to_string());
            observations.push(ObservationRecord {
                variable_name: name,
                value_measured: values[&variable],
                group,
            });
        }
        body.push_str(&line);
        body.push('\n');
    }

    let header_text = header_line.trim_start().trim_start_matches('@').trim();
    let content = format!(
        "{first_line} {mrk}\n{mrk}{treatment}{mrk}\n{mrk}{header}{mrk}\n{body}",
        first_line = config.instruction_first_line,
        treatment = request.treatment,
        header = header_text,
    );

    let output_dir = helpers::resolve_output_dir(request.output_dir.as_deref(), &request.file_path)?;
    let output_path = output_dir.join(format!("{stem}{tag}.{}", config.instruction_extension));
    serialization::write_text_artifact(&output_path, &content, "IO.INSTRUCTION_WRITE")?;
    info!(
        instruction = %output_path.display(),
        observations = observations.len(),
        "time-series instruction file written"
    );

    Ok(InstructionArtifact {
        observations,
        output_path,
    })
}
