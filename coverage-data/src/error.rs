//! Construction errors shared by the HTTP-backed adapters.

use thiserror::Error;

/// Failure to build an HTTP-backed adapter.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The `reqwest` client rejected its configuration.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The Tokio runtime could not be started.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The configured base URL is not an absolute URL that can carry a path.
    #[error("invalid base URL {url:?}: {message}")]
    BaseUrl {
        /// URL as configured.
        url: String,
        /// Parser or validation message.
        message: String,
    },
}
