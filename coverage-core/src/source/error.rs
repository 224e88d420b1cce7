use std::path::PathBuf;

use thiserror::Error;

/// Errors from [`crate::source::CoverageSource::query_postcode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoverageQueryError {
    /// The indexed store does not exist; setup has not been run.
    #[error("database not found at {path:?}; run 'setup' first")]
    Unavailable {
        /// Expected location of the store.
        path: PathBuf,
    },
    /// The store exists but could not be read.
    #[error("failed to read coverage store: {message}")]
    Backend {
        /// Error description from the storage layer.
        message: String,
    },
}
