//! Read-only access to an indexed coverage dataset.

mod error;

use crate::{PostcodeKey, RawCoverageRow};

pub use error::CoverageQueryError;

/// Exact-match lookups against a coverage dataset keyed by [`PostcodeKey`].
///
/// `Ok(None)` means the dataset is available but holds no row for the key.
/// When a dataset holds several rows for one key, which one is returned is
/// implementation defined.
pub trait CoverageSource {
    /// Fetch the row stored for `postcode`.
    fn query_postcode(
        &self,
        postcode: &PostcodeKey,
    ) -> Result<Option<RawCoverageRow>, CoverageQueryError>;
}

impl<T: CoverageSource + ?Sized> CoverageSource for &T {
    fn query_postcode(
        &self,
        postcode: &PostcodeKey,
    ) -> Result<Option<RawCoverageRow>, CoverageQueryError> {
        (**self).query_postcode(postcode)
    }
}

impl<T: CoverageSource + ?Sized> CoverageSource for std::sync::Arc<T> {
    fn query_postcode(
        &self,
        postcode: &PostcodeKey,
    ) -> Result<Option<RawCoverageRow>, CoverageQueryError> {
        (**self).query_postcode(postcode)
    }
}
