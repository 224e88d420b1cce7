//! Core domain types for UK mobile coverage checks.
//!
//! This crate owns the pieces that need no I/O of their own: postcode
//! normalisation, interpretation of raw coverage rows, the seams for the
//! geocoder and the coverage dataset, and the checker that composes them
//! into per-postcode results. Storage and network adapters live in
//! `coverage-data`.

#![forbid(unsafe_code)]

pub mod check;
pub mod coverage;
pub mod geo;
pub mod postcode;
pub mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use check::{CheckResult, CoverageChecker, NOT_IN_DATASET_NOTE};
pub use coverage::{
    COVERAGE_THRESHOLD, Metric, MobileSummary, NOT_AVAILABLE, Operator, OperatorCoverage,
    OverallCoverage, RawCoverageRow, interpret,
};
pub use geo::{GeoLookup, GeoLookupError, GeographicInfo};
pub use postcode::{PostcodeKey, normalise_postcode};
pub use source::{CoverageQueryError, CoverageSource};
