mod commands;
mod helpers;

use clap::Parser;
use dpest_core::DpestError;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match run(std::env::args()) {
        Ok(code) => code,
        Err(error) => {
            let generate_error = error.as_dpest_error();
            eprintln!("{}", generate_error.diagnostic_line());
            generate_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "dpest", about = "PEST calibration artifacts from DSSAT files")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Create a cultivar (.CUL) template file
    Cul(commands::CulArgs),
    /// Create an ecotype (.ECO) template file
    Eco(commands::EcoArgs),
    /// Create a species (.SPE) template file
    Spe(commands::SpeArgs),
    /// Create an OVERVIEW.OUT instruction file
    Overview(commands::OverviewArgs),
    /// Create a time-series (.OUT) instruction file
    Ts(commands::TsArgs),
    /// Extend a time-series file to cover measured dates
    Uts(commands::UtsArgs),
    /// Create the PEST control file from generated artifacts
    Pst(commands::PstArgs),
}

fn dispatch(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Cul(args) => commands::run_cul(args),
        CliCommand::Eco(args) => commands::run_eco(args),
        CliCommand::Spe(args) => commands::run_spe(args),
        CliCommand::Overview(args) => commands::run_overview(args),
        CliCommand::Ts(args) => commands::run_ts(args),
        CliCommand::Uts(args) => commands::run_uts(args),
        CliCommand::Pst(args) => commands::run_pst(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Generate(DpestError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<DpestError> for CliError {
    fn from(error: DpestError) -> Self {
        Self::Generate(error)
    }
}

impl CliError {
    fn as_dpest_error(&self) -> DpestError {
        match self {
            Self::Usage(message) => DpestError::validation("INPUT.CLI_USAGE", message.clone()),
            Self::Generate(error) => error.clone(),
            Self::Internal(error) => DpestError::io("IO.CLI", format!("{error:#}")),
        }
    }
}
