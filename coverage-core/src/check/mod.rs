//! Compose geocoding, dataset lookup and interpretation into check results.

use std::thread;

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    CoverageSource, GeoLookup, GeographicInfo, MobileSummary, PostcodeKey, coverage::interpret,
};

/// Note attached when the postcode is valid but absent from the dataset.
pub const NOT_IN_DATASET_NOTE: &str = "Postcode not found in Ofcom mobile dataset.";

/// Outcome of checking one postcode.
///
/// `mobile` is only populated when `valid` is true; the dataset is never
/// consulted for postcodes the geocoder rejects. A `note` explains why a
/// valid postcode carries no coverage summary.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CheckResult {
    /// Normalised postcode.
    pub postcode: PostcodeKey,
    /// Whether the geocoder accepted the postcode.
    pub valid: bool,
    /// Geographic attributes, when the geocoder succeeded.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub geographic: Option<GeographicInfo>,
    /// Coverage summary, when the dataset held a row.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub mobile: Option<MobileSummary>,
    /// Geocoding failure message.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
    /// Why a valid postcode has no coverage summary.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub note: Option<String>,
}

impl CheckResult {
    fn pending(postcode: PostcodeKey) -> Self {
        Self {
            postcode,
            ..Self::default()
        }
    }
}

/// Checks postcodes against a geocoder and a coverage dataset.
///
/// # Examples
///
/// ```
/// use coverage_core::{
///     CheckResult, CoverageChecker, CoverageQueryError, CoverageSource, GeoLookup,
///     GeoLookupError, GeographicInfo, PostcodeKey, RawCoverageRow,
/// };
///
/// struct AnyPostcode;
/// impl GeoLookup for AnyPostcode {
///     fn lookup(&self, key: &PostcodeKey) -> Result<GeographicInfo, GeoLookupError> {
///         Ok(GeographicInfo { postcode: key.to_string(), ..GeographicInfo::default() })
///     }
/// }
///
/// struct FullCoverage;
/// impl CoverageSource for FullCoverage {
///     fn query_postcode(
///         &self,
///         key: &PostcodeKey,
///     ) -> Result<Option<RawCoverageRow>, CoverageQueryError> {
///         Ok(Some(RawCoverageRow::from([("postcode", key.as_str()), ("ee_4g", "1.0")])))
///     }
/// }
///
/// let checker = CoverageChecker::new(AnyPostcode, FullCoverage);
/// let results = checker.check_multiple(&["sw1a 1aa", "ec1a 1bb"]);
/// assert_eq!(results[0].postcode.as_str(), "SW1A1AA");
/// assert_eq!(results[1].postcode.as_str(), "EC1A1BB");
/// assert!(results.iter().all(|result| result.mobile.is_some()));
/// ```
#[derive(Debug, Clone)]
pub struct CoverageChecker<G, S> {
    geocoder: G,
    source: S,
}

impl<G, S> CoverageChecker<G, S>
where
    G: GeoLookup,
    S: CoverageSource,
{
    /// Build a checker from a geocoder and a coverage source.
    pub const fn new(geocoder: G, source: S) -> Self {
        Self { geocoder, source }
    }

    /// Borrow the geocoder.
    pub const fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Borrow the coverage source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Check a single postcode.
    ///
    /// Geocoding failures produce an invalid result without touching the
    /// dataset. Dataset failures and misses keep the result valid and attach
    /// a note instead of a summary.
    pub fn check(&self, postcode: &str) -> CheckResult {
        let key = PostcodeKey::normalise(postcode);
        let mut result = CheckResult::pending(key.clone());

        let geographic = match self.geocoder.lookup(&key) {
            Ok(info) => info,
            Err(err) => {
                debug!("Geocoding {key} failed: {err}");
                result.error = Some(format!("Postcode lookup failed: {err}"));
                return result;
            }
        };
        result.valid = true;
        result.geographic = Some(geographic);

        match self.source.query_postcode(&key) {
            Ok(Some(row)) => result.mobile = Some(interpret(&row)),
            Ok(None) => result.note = Some(NOT_IN_DATASET_NOTE.to_owned()),
            Err(err) => {
                debug!("Coverage lookup for {key} failed: {err}");
                result.note = Some(format!("Mobile data unavailable: {err}"));
            }
        }
        result
    }
}

impl<G, S> CoverageChecker<G, S>
where
    G: GeoLookup + Sync,
    S: CoverageSource + Sync,
{
    /// Check every postcode concurrently, one thread per postcode.
    ///
    /// The returned list matches `postcodes` in length and order regardless
    /// of completion order: each thread writes only to the slot at its input
    /// index, and the scope joins every thread before returning. A slow
    /// postcode delays the batch but never cancels its siblings.
    pub fn check_multiple<P>(&self, postcodes: &[P]) -> Vec<CheckResult>
    where
        P: AsRef<str> + Sync,
    {
        let mut results: Vec<CheckResult> = postcodes
            .iter()
            .map(|postcode| CheckResult::pending(PostcodeKey::normalise(postcode.as_ref())))
            .collect();

        thread::scope(|scope| {
            for (slot, postcode) in results.iter_mut().zip(postcodes) {
                scope.spawn(move || *slot = self.check(postcode.as_ref()));
            }
        });

        results
    }
}
