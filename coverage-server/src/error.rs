//! Errors raised while starting or running the HTTP server.

use std::{io, net::SocketAddr};

use coverage_data::ClientBuildError;
use thiserror::Error;

/// Errors emitted by the coverage server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No data directory was given and none could be derived from `$HOME`.
    #[error("missing data-dir (set --data-dir or HOME)")]
    MissingDataDir,
    /// Constructing the postcodes.io client failed.
    #[error("failed to build geocoder for {base_url:?}: {source}")]
    BuildGeocoder {
        base_url: String,
        #[source]
        source: ClientBuildError,
    },
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    BuildRuntime(#[source] io::Error),
    /// Binding the listening socket failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
