use thiserror::Error;

/// Errors from [`crate::geo::GeoLookup::lookup`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoLookupError {
    /// Normalisation left no characters to look up.
    #[error("postcode is empty")]
    EmptyPostcode,

    /// The geocoder rejected the postcode as unknown or invalid.
    #[error("postcode {postcode:?} not found or invalid")]
    NotFound {
        /// Postcode as submitted to the geocoder.
        postcode: String,
    },

    /// The request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The geocoder answered with an unexpected HTTP status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },

    /// The geocoder could not be reached.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Error description.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("failed to parse geocoder response: {message}")]
    Parse {
        /// Error description.
        message: String,
    },
}

impl GeoLookupError {
    /// Whether the error means the postcode itself is invalid, as opposed to
    /// a transport failure.
    #[must_use]
    pub const fn is_invalid_postcode(&self) -> bool {
        matches!(self, Self::EmptyPostcode | Self::NotFound { .. })
    }
}
