//! Command-line interface for UK mobile coverage checks.
#![forbid(unsafe_code)]

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use coverage_data::dataset::default_data_dir;

mod check;
mod error;
mod render;
mod setup;

pub use error::CliError;

use check::CheckArgs;
use setup::SetupArgs;

const ARG_DATA_DIR: &str = "data-dir";
const ARG_EDITION: &str = "edition";
const ARG_FORCE: &str = "force";
const ARG_GEOCODER_URL: &str = "geocoder-url";
const ARG_JSON: &str = "json";
const ARG_POSTCODES: &str = "postcodes";
const ENV_SETUP_DATA_DIR: &str = "MOBILE_COVERAGE_CMDS_SETUP_DATA_DIR";
const ENV_CHECK_DATA_DIR: &str = "MOBILE_COVERAGE_CMDS_CHECK_DATA_DIR";
const ENV_CHECK_POSTCODES: &str = "MOBILE_COVERAGE_CMDS_CHECK_POSTCODES";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration merging, the
/// dataset setup or writing the output fails. Per-postcode failures are part
/// of the printed results, not errors.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Setup(args) => setup::run_setup(args),
        Command::Check(args) => check::run_check(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "mobile-coverage",
    about = "Check UK mobile coverage using Ofcom open data and postcodes.io",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download and build the Ofcom mobile coverage store (run once).
    Setup(SetupArgs),
    /// Check mobile coverage for one or more postcodes.
    Check(CheckArgs),
}

/// Resolve the data directory from an explicit value or `$HOME`.
fn resolve_data_dir(
    explicit: Option<Utf8PathBuf>,
    home: Option<OsString>,
    env: &'static str,
) -> Result<Utf8PathBuf, CliError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    default_data_dir(home).ok_or(CliError::MissingArgument {
        field: ARG_DATA_DIR,
        env,
    })
}

#[cfg(test)]
mod tests;
