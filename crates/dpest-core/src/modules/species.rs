//! Template generation for DSSAT species (.SPE) files. Species files are
//! not reliably tabular, so callers address each parameter by explicit
//! (line, column) position and bounds.

use super::{helpers, serialization};
use crate::common::GeneratorConfig;
use crate::domain::{DpestError, DpestResult, MarkerPair, ParameterSpec, TemplateArtifact};
use crate::layout;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRequest {
    pub file_path: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub parameters: Vec<ParameterSpec>,
    pub markers: MarkerPair,
}

impl SpeciesRequest {
    pub fn new(file_path: impl Into<PathBuf>, parameters: Vec<ParameterSpec>) -> Self {
        Self {
            file_path: file_path.into(),
            output_dir: None,
            parameters,
            markers: MarkerPair::default(),
        }
    }
}

pub fn spe(config: &GeneratorConfig, request: &SpeciesRequest) -> DpestResult<TemplateArtifact> {
    if request.parameters.is_empty() {
        return Err(DpestError::validation(
            "INPUT.PARAMETERS",
            "at least one species parameter location must be specified",
        ));
    }
    let stem = helpers::validated_stem(&request.file_path, &config.species_extension)?;
    let source_label = request.file_path.display().to_string();

    let text = serialization::read_source(&request.file_path, "IO.SPECIES_READ")?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    let assembled = layout::assemble(
        &lines,
        &request.parameters,
        request.markers.primary(),
        config.species_fill,
        &config.template_first_line,
        &source_label,
    )?;

    let output_dir = helpers::resolve_output_dir(request.output_dir.as_deref(), &request.file_path)?;
    let output_path = output_dir.join(format!("{stem}_SPE.{}", config.template_extension));
    serialization::write_text_artifact(
        &output_path,
        &assembled.lines.join("\n"),
        "IO.TEMPLATE_WRITE",
    )?;
    info!(
        template = %output_path.display(),
        parameters = assembled.parameters.len(),
        "species template written"
    );

    Ok(TemplateArtifact {
        parameters: assembled.parameters,
        output_path,
    })
}
