//! Storage and network adapters for the coverage checker.
//!
//! Responsibilities:
//! - Acquire Ofcom coverage archives and build the indexed SQLite store
//!   ([`dataset`]).
//! - Serve read-only postcode lookups from that store through
//!   [`coverage_core::CoverageSource`].
//! - Resolve postcodes against postcodes.io through
//!   [`coverage_core::GeoLookup`] ([`geocode`]).
//!
//! Boundaries:
//! - Do not encode interpretation rules (live in `coverage-core`).
//! - Keep blocking I/O off async executors; ingestion and extraction run on
//!   the blocking pool.
//!
//! Invariants:
//! - No global mutable state; edition tables are owned per manager.

pub mod dataset;
pub mod error;
pub mod geocode;

pub use dataset::{
    ArchiveSource, CoverageStore, DatasetError, DatasetManager, EditionTable, HttpArchiveSource,
    IngestReport, SetupReport,
};
pub use error::ClientBuildError;
pub use geocode::{HttpGeoLookup, HttpGeoLookupConfig};
