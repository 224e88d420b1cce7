//! Facade crate for UK mobile coverage checks.
//!
//! This crate re-exports the core domain types and, behind the
//! `dataset-sqlite` feature, the local Ofcom store and the postcodes.io
//! geocoder.

#![forbid(unsafe_code)]

pub use coverage_core::{
    COVERAGE_THRESHOLD, CheckResult, CoverageChecker, CoverageQueryError, CoverageSource,
    GeoLookup, GeoLookupError, GeographicInfo, MobileSummary, NOT_AVAILABLE,
    NOT_IN_DATASET_NOTE, Operator, OperatorCoverage, OverallCoverage, PostcodeKey,
    RawCoverageRow, interpret, normalise_postcode,
};

#[cfg(feature = "dataset-sqlite")]
pub use coverage_data::{
    ArchiveSource, CoverageStore, DatasetError, DatasetManager, EditionTable, HttpArchiveSource,
    HttpGeoLookup, HttpGeoLookupConfig, IngestReport, SetupReport,
};

#[cfg(feature = "test-support")]
pub use coverage_core::test_support;
