//! Command-line configuration for the server binary.

use std::{ffi::OsString, net::SocketAddr};

use camino::Utf8PathBuf;
use clap::Parser;
use coverage_data::{HttpGeoLookupConfig, dataset::default_data_dir};

use crate::ServerError;

/// Address the server listens on unless `--addr` is given.
pub const DEFAULT_ADDR: &str = "0.0.0.0:5001";

/// Arguments accepted by `mobile-coverage-server`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mobile-coverage-server",
    about = "Serve UK mobile coverage checks over HTTP",
    version
)]
pub struct ServerArgs {
    /// Socket address to listen on.
    #[arg(long, value_name = "addr", default_value = DEFAULT_ADDR)]
    pub addr: SocketAddr,
    /// Directory holding the coverage store built by `mobile-coverage setup`.
    #[arg(long = "data-dir", value_name = "dir")]
    pub data_dir: Option<Utf8PathBuf>,
    /// Base URL of the postcodes.io service.
    #[arg(long = "geocoder-url", value_name = "url")]
    pub geocoder_url: Option<String>,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listening address.
    pub addr: SocketAddr,
    /// Coverage data directory.
    pub data_dir: Utf8PathBuf,
    /// Geocoder base URL.
    pub geocoder_url: String,
}

impl ServerConfig {
    /// Resolve `args`, falling back to the data directory under `home`.
    ///
    /// # Errors
    ///
    /// [`ServerError::MissingDataDir`] when no data directory is given and
    /// `home` cannot supply one.
    pub fn resolve(args: ServerArgs, home: Option<OsString>) -> Result<Self, ServerError> {
        let data_dir = match args.data_dir {
            Some(dir) => dir,
            None => default_data_dir(home).ok_or(ServerError::MissingDataDir)?,
        };
        Ok(Self {
            addr: args.addr,
            data_dir,
            geocoder_url: args
                .geocoder_url
                .unwrap_or_else(|| HttpGeoLookupConfig::default().base_url),
        })
    }
}

impl TryFrom<ServerArgs> for ServerConfig {
    type Error = ServerError;

    fn try_from(args: ServerArgs) -> Result<Self, Self::Error> {
        Self::resolve(args, std::env::var_os("HOME"))
    }
}
