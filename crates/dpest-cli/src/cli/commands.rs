use super::CliError;
use super::helpers::*;
use anyhow::Context;
use dpest_core::modules::{extend, genotype, overview, pst, species, timeseries};
use dpest_core::{GeneratedParameterSet, InstructionArtifact, ObservationTable, TemplateArtifact};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub(super) struct CommonArgs {
    /// Directory for generated artifacts (defaults to the source directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON configuration overlay merged over the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Primary marker delimiter
    #[arg(long, default_value = "~")]
    mrk: char,

    /// Secondary marker delimiter
    #[arg(long, default_value = "!")]
    smk: char,

    /// Also write the parameter/observation bundle as JSON, for `dpest pst`
    #[arg(long)]
    bundle: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct CulArgs {
    /// Path to the DSSAT cultivar file (e.g. WHCER048.CUL)
    cul_file: PathBuf,

    /// Cultivar name as listed in the file (e.g. MANITOU)
    #[arg(long)]
    cultivar: String,

    /// Parameter group definition, repeatable (e.g. --group P=P1V,P1D,P5)
    #[arg(long = "group")]
    groups: Vec<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(clap::Args)]
pub(super) struct EcoArgs {
    /// Path to the DSSAT ecotype file (e.g. WHCER048.ECO)
    eco_file: PathBuf,

    /// Ecotype code as listed in the file (e.g. CAWH01)
    #[arg(long)]
    ecotype: String,

    /// Parameter group definition, repeatable (e.g. --group PHEN=P1,P2)
    #[arg(long = "group")]
    groups: Vec<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(clap::Args)]
pub(super) struct SpeArgs {
    /// Path to the DSSAT species file (e.g. WHCER048.SPE)
    spe_file: PathBuf,

    /// Parameter location, repeatable (NAME=line,column,min,max[,group])
    #[arg(long = "parameter", required = true)]
    parameters: Vec<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(clap::Args)]
pub(super) struct OverviewArgs {
    /// Path to the OVERVIEW.OUT file
    overview_file: PathBuf,

    /// Treatment name exactly as printed in the file
    #[arg(long)]
    treatment: String,

    /// Restrict to these overview variables (repeatable)
    #[arg(long = "variable")]
    variables: Vec<String>,

    /// Treatment tag appended to names and the output filename
    #[arg(long)]
    suffix: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(clap::Args)]
pub(super) struct TsArgs {
    /// Path to the time-series output file (e.g. PlantGro.OUT)
    ts_file: PathBuf,

    /// Treatment name exactly as printed in the file
    #[arg(long)]
    treatment: String,

    /// T-file variable code, repeatable (e.g. --variable LAID)
    #[arg(long = "variable", required = true)]
    variables: Vec<String>,

    /// Treatment tag appended to names and the output filename
    #[arg(long)]
    suffix: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(clap::Args)]
pub(super) struct UtsArgs {
    /// Path to the time-series output file to extend in place
    ts_file: PathBuf,

    /// Treatment name exactly as printed in the file
    #[arg(long)]
    treatment: String,

    /// T-file variable code, repeatable
    #[arg(long = "variable", required = true)]
    variables: Vec<String>,

    /// JSON configuration overlay merged over the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct PstArgs {
    /// Parameter bundle JSON written by cul/eco/spe --bundle, repeatable
    #[arg(long = "parameters", required = true)]
    parameters: Vec<PathBuf>,

    /// Observation bundle JSON written by overview/ts --bundle, repeatable
    #[arg(long = "observations", required = true)]
    observations: Vec<PathBuf>,

    /// Template/instruction path paired with its model file, repeatable
    /// (e.g. --pair WHCER048_CUL.TPL:WHCER048.CUL)
    #[arg(long = "pair", required = true)]
    pairs: Vec<String>,

    /// Command PEST runs to invoke the model
    #[arg(long)]
    command: String,

    /// Directory for the control file (defaults to the working directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Control file name
    #[arg(long, default_value = "PEST_CONTROL.pst")]
    filename: String,
}

pub(super) fn run_cul(args: CulArgs) -> Result<i32, CliError> {
    let config = load_config(args.common.config.as_ref())?;
    let mut request = genotype::GenotypeRequest::new(&args.cul_file, &args.cultivar);
    request.output_dir = args.common.output_dir.clone();
    request.markers = marker_pair(args.common.mrk, args.common.smk)?;
    request.groups = args
        .groups
        .iter()
        .map(|group| parse_group(group))
        .collect::<Result<_, _>>()?;

    let artifact = genotype::cul(&config, &request)?;
    if let Some(bundle) = &args.common.bundle {
        write_bundle(bundle, &artifact.parameters)?;
    }
    report_template(&artifact);
    Ok(0)
}

pub(super) fn run_eco(args: EcoArgs) -> Result<i32, CliError> {
    let config = load_config(args.common.config.as_ref())?;
    let mut request = genotype::GenotypeRequest::new(&args.eco_file, &args.ecotype);
    request.output_dir = args.common.output_dir.clone();
    request.markers = marker_pair(args.common.mrk, args.common.smk)?;
    request.groups = args
        .groups
        .iter()
        .map(|group| parse_group(group))
        .collect::<Result<_, _>>()?;

    let artifact = genotype::eco(&config, &request)?;
    if let Some(bundle) = &args.common.bundle {
        write_bundle(bundle, &artifact.parameters)?;
    }
    report_template(&artifact);
    Ok(0)
}

pub(super) fn run_spe(args: SpeArgs) -> Result<i32, CliError> {
    let config = load_config(args.common.config.as_ref())?;
    let parameters = args
        .parameters
        .iter()
        .map(|parameter| parse_parameter_spec(parameter))
        .collect::<Result<Vec<_>, _>>()?;
    let mut request = species::SpeciesRequest::new(&args.spe_file, parameters);
    request.output_dir = args.common.output_dir.clone();
    request.markers = marker_pair(args.common.mrk, args.common.smk)?;

    let artifact = species::spe(&config, &request)?;
    if let Some(bundle) = &args.common.bundle {
        write_bundle(bundle, &artifact.parameters)?;
    }
    report_template(&artifact);
    Ok(0)
}

pub(super) fn run_overview(args: OverviewArgs) -> Result<i32, CliError> {
    let config = load_config(args.common.config.as_ref())?;
    let mut request = overview::OverviewRequest::new(&args.overview_file, &args.treatment);
    request.output_dir = args.common.output_dir.clone();
    request.markers = marker_pair(args.common.mrk, args.common.smk)?;
    request.suffix = parse_suffix(args.suffix.as_deref())?;
    if !args.variables.is_empty() {
        request.variables = Some(args.variables.clone());
    }

    let artifact = overview::overview(&config, &request)?;
    if let Some(bundle) = &args.common.bundle {
        write_bundle(bundle, &artifact.observations)?;
    }
    report_instruction(&artifact);
    Ok(0)
}

pub(super) fn run_ts(args: TsArgs) -> Result<i32, CliError> {
    let config = load_config(args.common.config.as_ref())?;
    let mut request = timeseries::TimeSeriesRequest::new(
        &args.ts_file,
        &args.treatment,
        args.variables.clone(),
    );
    request.output_dir = args.common.output_dir.clone();
    request.markers = marker_pair(args.common.mrk, args.common.smk)?;
    request.suffix = parse_suffix(args.suffix.as_deref())?;

    let artifact = timeseries::ts(&config, &request)?;
    if let Some(bundle) = &args.common.bundle {
        write_bundle(bundle, &artifact.observations)?;
    }
    report_instruction(&artifact);
    Ok(0)
}

pub(super) fn run_uts(args: UtsArgs) -> Result<i32, CliError> {
    let config = load_config(args.config.as_ref())?;
    let request =
        extend::ExtendRequest::new(&args.ts_file, &args.treatment, args.variables.clone());
    let report = extend::extend(&config, &request)?;
    if report.rows_added == 0 {
        println!("{}: no update required.", report.output_path.display());
    } else {
        println!(
            "{}: {} row{} added.",
            report.output_path.display(),
            report.rows_added,
            if report.rows_added == 1 { "" } else { "s" }
        );
    }
    Ok(0)
}

pub(super) fn run_pst(args: PstArgs) -> Result<i32, CliError> {
    let mut io_pairs = Vec::with_capacity(args.pairs.len());
    for pair in &args.pairs {
        let (artifact, model_file) = pair.split_once(':').ok_or_else(|| {
            CliError::Usage(format!(
                "pair '{pair}' must have the form ARTIFACT:MODEL_FILE"
            ))
        })?;
        io_pairs.push((PathBuf::from(artifact), PathBuf::from(model_file)));
    }

    let parameter_sets = args
        .parameters
        .iter()
        .map(|path| read_bundle::<GeneratedParameterSet>(path))
        .collect::<Result<Vec<_>, _>>()?;
    let observations = args
        .observations
        .iter()
        .map(|path| read_bundle::<ObservationTable>(path))
        .collect::<Result<Vec<_>, _>>()?;

    let request = pst::ControlFileRequest {
        parameter_sets,
        observations,
        model_command_line: args.command.clone(),
        io_pairs,
        output_dir: args.output_dir.clone(),
        filename: Some(args.filename.clone()),
    };
    let path = pst::pst(&request)?;
    println!("Control file written to {}", path.display());
    Ok(0)
}

fn read_bundle<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read bundle '{}'", path.display()))?;
    let bundle = serde_json::from_str(&raw)
        .with_context(|| format!("bundle '{}' is not valid JSON", path.display()))?;
    Ok(bundle)
}

fn write_bundle<T: serde::Serialize>(path: &Path, bundle: &T) -> Result<(), CliError> {
    let raw = serde_json::to_string_pretty(bundle)
        .context("failed to serialize bundle")?;
    fs::write(path, raw + "\n")
        .with_context(|| format!("failed to write bundle '{}'", path.display()))?;
    Ok(())
}

fn report_template(artifact: &TemplateArtifact) {
    println!("Template file written to {}", artifact.output_path.display());
    for entry in artifact.parameters.entries() {
        println!(
            "  {} = {} (group {}, range {}..{})",
            entry.id, entry.value, entry.group, entry.min, entry.max
        );
    }
}

fn report_instruction(artifact: &InstructionArtifact) {
    println!(
        "Instruction file written to {}",
        artifact.output_path.display()
    );
    for record in artifact.observations.records() {
        println!(
            "  {} = {} (group {})",
            record.variable_name, record.value_measured, record.group
        );
    }
}
