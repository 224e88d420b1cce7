//! Error types emitted by the coverage CLI.
//!
//! Postcode-level failures never surface here: they are rendered as part of
//! each check result. These variants cover invocation and I/O problems only.

use std::sync::Arc;

use coverage_data::{ClientBuildError, DatasetError};
use thiserror::Error;

/// Errors emitted by the coverage CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The async runtime driving setup could not be started.
    #[error("failed to start async runtime: {0}")]
    BuildRuntime(#[source] std::io::Error),
    /// Constructing the archive download client failed.
    #[error("failed to build archive download client: {0}")]
    BuildArchiveSource(#[source] ClientBuildError),
    /// Constructing the postcodes.io client failed.
    #[error("failed to build geocoder for {base_url:?}: {source}")]
    BuildGeocoder {
        base_url: String,
        #[source]
        source: ClientBuildError,
    },
    /// Dataset setup failed.
    #[error("setup failed: {0}")]
    Setup(#[from] DatasetError),
    /// Serializing check results failed.
    #[error("failed to serialize check results: {0}")]
    SerializeResults(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
