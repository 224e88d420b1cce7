//! Setup command: download an Ofcom edition and build the local store.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use coverage_data::{
    ArchiveSource, DatasetManager, HttpArchiveSource, SetupReport, dataset::DEFAULT_EDITION,
};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATA_DIR, ARG_EDITION, ARG_FORCE, CliError, ENV_SETUP_DATA_DIR, render, resolve_data_dir,
};

/// CLI arguments for the `setup` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Download the Ofcom Connected Nations postcode archive for an \
                 edition, extract its CSV and build the local lookup store. \
                 Existing artefacts are reused unless --force is given.",
    about = "Download and build the Ofcom mobile coverage store"
)]
#[ortho_config(prefix = "MOBILE_COVERAGE")]
pub(crate) struct SetupArgs {
    /// Directory holding the raw CSV and the coverage store.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// Dataset edition (e.g. "2023").
    #[arg(long = ARG_EDITION, value_name = "edition")]
    #[serde(default)]
    pub(crate) edition: Option<String>,
    /// Re-download and rebuild even when artefacts exist.
    #[arg(long = ARG_FORCE)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) force: bool,
}

impl SetupArgs {
    pub(crate) fn into_config(self) -> Result<SetupConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SetupConfig::try_from(merged)
    }
}

/// Resolved `setup` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SetupConfig {
    pub(crate) data_dir: Utf8PathBuf,
    pub(crate) edition: String,
    pub(crate) force: bool,
}

impl TryFrom<SetupArgs> for SetupConfig {
    type Error = CliError;

    fn try_from(args: SetupArgs) -> Result<Self, Self::Error> {
        let data_dir = resolve_data_dir(
            args.data_dir,
            std::env::var_os("HOME"),
            ENV_SETUP_DATA_DIR,
        )?;
        Ok(Self {
            data_dir,
            edition: args.edition.unwrap_or_else(|| DEFAULT_EDITION.to_owned()),
            force: args.force,
        })
    }
}

pub(crate) fn run_setup(args: SetupArgs) -> Result<(), CliError> {
    let source = HttpArchiveSource::new().map_err(CliError::BuildArchiveSource)?;
    let mut stdout = std::io::stdout().lock();
    run_setup_with(args, &source, &mut stdout)
}

pub(crate) fn run_setup_with(
    args: SetupArgs,
    source: &dyn ArchiveSource,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    render::write_setup_banner(writer, &config.edition)?;
    let report = execute_setup(&config, source)?;
    render::write_setup_report(writer, &report)
}

fn execute_setup(
    config: &SetupConfig,
    source: &dyn ArchiveSource,
) -> Result<SetupReport, CliError> {
    debug!("Using data directory {}", config.data_dir);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::BuildRuntime)?;
    let manager = DatasetManager::new(config.data_dir.clone());
    let report = runtime.block_on(manager.setup(source, &config.edition, config.force))?;
    Ok(report)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SetupConfig, CliError> {
    let merged = SetupArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SetupConfig::try_from(merged)
}
