//! Template generation for DSSAT genotype coefficient files: `cul` for
//! cultivar files and `eco` for ecotype files. Both resolve parameter
//! addresses by aligning header columns with the selected entry row, then
//! hand the resulting specs to the two-pass assembler.

use super::{helpers, serialization};
use crate::common::GeneratorConfig;
use crate::domain::{DpestResult, MarkerPair, ParameterSpec, TemplateArtifact};
use crate::layout;
use crate::tabular::genotype;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenotypeKind {
    Cultivar,
    Ecotype,
}

impl GenotypeKind {
    const fn stem_tag(self) -> &'static str {
        match self {
            Self::Cultivar => "_CUL",
            Self::Ecotype => "_ECO",
        }
    }
}

/// Inputs shared by the cultivar and ecotype generators. `groups` maps a
/// PEST parameter group to the header names of the coefficients to
/// calibrate; an empty list falls back to the configured default grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeRequest {
    pub file_path: PathBuf,
    pub output_dir: Option<PathBuf>,
    /// Cultivar or ecotype label identifying the data row.
    pub entry: String,
    pub groups: Vec<(String, Vec<String>)>,
    pub markers: MarkerPair,
}

impl GenotypeRequest {
    pub fn new(file_path: impl Into<PathBuf>, entry: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            output_dir: None,
            entry: entry.into(),
            groups: Vec::new(),
            markers: MarkerPair::default(),
        }
    }
}

/// Generates a PEST template for a cultivar (.CUL) file.
pub fn cul(config: &GeneratorConfig, request: &GenotypeRequest) -> DpestResult<TemplateArtifact> {
    generate(config, request, GenotypeKind::Cultivar)
}

/// Generates a PEST template for an ecotype (.ECO) file.
pub fn eco(config: &GeneratorConfig, request: &GenotypeRequest) -> DpestResult<TemplateArtifact> {
    generate(config, request, GenotypeKind::Ecotype)
}

fn generate(
    config: &GeneratorConfig,
    request: &GenotypeRequest,
    kind: GenotypeKind,
) -> DpestResult<TemplateArtifact> {
    let extension = match kind {
        GenotypeKind::Cultivar => &config.cultivar_extension,
        GenotypeKind::Ecotype => &config.ecotype_extension,
    };
    let stem = helpers::validated_stem(&request.file_path, extension)?;
    let source_label = request.file_path.display().to_string();

    let text = serialization::read_source(&request.file_path, "IO.GENOTYPE_READ")?;
    let table = genotype::parse(&text, &source_label)?;
    let row_index = table.locate_entry(&request.entry, &source_label)?;

    let groups = if request.groups.is_empty() {
        match kind {
            GenotypeKind::Cultivar => config.cultivar_groups.clone(),
            GenotypeKind::Ecotype => config.ecotype_groups.clone(),
        }
    } else {
        request.groups.clone()
    };

    let mut specs = Vec::new();
    for (group, parameters) in &groups {
        for parameter in parameters {
            let (line, column) = table.locate_parameter(row_index, parameter, &source_label)?;
            let (min, max) = config.genotype_bounds_for(parameter)?;
            specs.push(ParameterSpec::new(
                parameter.clone(),
                line,
                column,
                min,
                max,
                Some(group.clone()),
            )?);
        }
    }

    let assembled = layout::assemble(
        table.lines(),
        &specs,
        request.markers.primary(),
        config.genotype_fill,
        &config.template_first_line,
        &source_label,
    )?;

    let output_dir = helpers::resolve_output_dir(request.output_dir.as_deref(), &request.file_path)?;
    let output_path = output_dir.join(format!(
        "{stem}{}.{}",
        kind.stem_tag(),
        config.template_extension
    ));
    serialization::write_text_artifact(
        &output_path,
        &assembled.lines.join("\n"),
        "IO.TEMPLATE_WRITE",
    )?;
    info!(
        template = %output_path.display(),
        parameters = assembled.parameters.len(),
        "genotype template written"
    );

    Ok(TemplateArtifact {
        parameters: assembled.parameters,
        output_path,
    })
}
