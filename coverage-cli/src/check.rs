//! Check command: geocode postcodes and report their mobile coverage.

use std::{io::Write, sync::Arc};

use camino::Utf8PathBuf;
use clap::Parser;
use coverage_core::{CheckResult, CoverageChecker, GeoLookup};
use coverage_data::{DatasetManager, HttpGeoLookup, HttpGeoLookupConfig};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATA_DIR, ARG_GEOCODER_URL, ARG_JSON, ARG_POSTCODES, CliError, ENV_CHECK_DATA_DIR,
    ENV_CHECK_POSTCODES, render, resolve_data_dir,
};

/// CLI arguments for the `check` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Validate each postcode against postcodes.io and report \
                 per-operator voice, 4G and 5G coverage from the local \
                 Ofcom store. Run `setup` first to build the store.",
    about = "Check mobile coverage for one or more postcodes"
)]
#[ortho_config(prefix = "MOBILE_COVERAGE")]
pub(crate) struct CheckArgs {
    /// Postcodes to check (e.g. "SW1A 1AA" or SW1A1AA).
    #[arg(value_name = "POSTCODE")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) postcodes: Vec<String>,
    /// Directory holding the coverage store.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// Base URL of the postcodes.io service.
    #[arg(long = ARG_GEOCODER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_url: Option<String>,
    /// Print results as JSON.
    #[arg(long = ARG_JSON)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) json: bool,
}

impl CheckArgs {
    pub(crate) fn into_config(self) -> Result<CheckConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CheckConfig::try_from(merged)
    }
}

/// Resolved `check` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckConfig {
    pub(crate) postcodes: Vec<String>,
    pub(crate) data_dir: Utf8PathBuf,
    pub(crate) geocoder_url: String,
    pub(crate) json: bool,
}

impl TryFrom<CheckArgs> for CheckConfig {
    type Error = CliError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        if args.postcodes.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_POSTCODES,
                env: ENV_CHECK_POSTCODES,
            });
        }
        let data_dir = resolve_data_dir(
            args.data_dir,
            std::env::var_os("HOME"),
            ENV_CHECK_DATA_DIR,
        )?;
        let default_base_url = HttpGeoLookupConfig::default().base_url;
        Ok(Self {
            postcodes: args.postcodes,
            data_dir,
            geocoder_url: args.geocoder_url.unwrap_or(default_base_url),
            json: args.json,
        })
    }
}

/// Shared geocoder handed to the checker.
pub(crate) type SharedGeocoder = Arc<dyn GeoLookup + Send + Sync>;

/// Builds the geocoder for the current check invocation.
pub(crate) trait GeocoderBuilder {
    fn build(&self, config: &CheckConfig) -> Result<SharedGeocoder, CliError>;
}

pub(crate) struct DefaultGeocoderBuilder;

impl GeocoderBuilder for DefaultGeocoderBuilder {
    fn build(&self, config: &CheckConfig) -> Result<SharedGeocoder, CliError> {
        let lookup_config = HttpGeoLookupConfig::new(config.geocoder_url.clone());
        let geocoder = HttpGeoLookup::with_config(lookup_config).map_err(|source| {
            CliError::BuildGeocoder {
                base_url: config.geocoder_url.clone(),
                source,
            }
        })?;
        Ok(Arc::new(geocoder))
    }
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_check_with(args, &DefaultGeocoderBuilder, &mut stdout)
}

pub(crate) fn run_check_with(
    args: CheckArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let results = execute_check(&config, builder)?;
    if config.json {
        render::write_json(writer, &results)
    } else {
        render::write_results(writer, &results)
    }
}

fn execute_check(
    config: &CheckConfig,
    builder: &dyn GeocoderBuilder,
) -> Result<Vec<CheckResult>, CliError> {
    let geocoder = builder.build(config)?;
    let manager = DatasetManager::new(config.data_dir.clone());
    debug!("Reading coverage from {}", manager.store_path());
    let checker = CoverageChecker::new(geocoder, manager);
    let results = match config.postcodes.as_slice() {
        [postcode] => vec![checker.check(postcode)],
        postcodes => checker.check_multiple(postcodes),
    };
    Ok(results)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<CheckConfig, CliError> {
    let merged = CheckArgs::merge_from_layers(layers).map_err(CliError::from)?;
    CheckConfig::try_from(merged)
}
