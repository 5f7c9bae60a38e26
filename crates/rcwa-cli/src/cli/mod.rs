mod commands;
mod helpers;

use clap::Parser;
use rcwa_core::domain::RcwaError;

pub fn run_from_env() -> i32 {
    helpers::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let rcwa_error = error.as_rcwa_error();
            eprintln!("{}", rcwa_error.diagnostic_line());
            eprintln!("{}", rcwa_error.fatal_exit_line());
            rcwa_error.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
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
#[command(
    name = "rcwa",
    version,
    about = "Inspect tabulated material dispersion used by the RCWA solver"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Evaluate optical constants at the given wavelengths
    Query(commands::QueryArgs),
    /// Evaluate optical constants on a uniform wavelength grid
    Sweep(commands::SweepArgs),
    /// Show table size and tabulated wavelength range
    Info(commands::InfoArgs),
    /// List materials available in the nk data directory
    List(commands::ListArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Query(args) => commands::run_query_command(args),
        CliCommand::Sweep(args) => commands::run_sweep_command(args),
        CliCommand::Info(args) => commands::run_info_command(args),
        CliCommand::List(args) => commands::run_list_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(RcwaError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_rcwa_error(&self) -> RcwaError {
        match self {
            Self::Usage(message) => RcwaError::input_validation("INPUT.CLI_USAGE", message.trim_end()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => RcwaError::internal("SYS.CLI", format!("{error:#}")),
        }
    }
}

impl From<RcwaError> for CliError {
    fn from(error: RcwaError) -> Self {
        Self::Compute(error)
    }
}
