//! Acquisition, ingestion and querying of the Ofcom coverage dataset.
//!
//! Setup downloads an edition's ZIP archive through an [`ArchiveSource`],
//! extracts its CSV next to the store, and bulk loads it into SQLite with
//! normalised column names and postcodes. Queries then open the store
//! read-only and return raw rows for the interpreter in `coverage-core`.
#![forbid(unsafe_code)]

mod edition;
mod error;
mod extract;
mod ingest;
mod manager;
mod source;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use edition::{DEFAULT_EDITION, EditionTable};
pub use error::{DatasetError, ExtractError, IngestError, TransportError};
pub use extract::{ExtractedCsv, extract_first_csv};
pub use ingest::{
    DEFAULT_BATCH_SIZE, IngestReport, POSTCODE_COLUMN, TABLE_NAME, ingest_csv,
    normalise_column_name, store_columns,
};
pub use manager::{
    DEFAULT_DATA_DIR, DatasetManager, STORE_FILE_NAME, SetupReport, default_data_dir,
};
pub use source::{ArchiveSource, DEFAULT_USER_AGENT, HttpArchiveSource, HttpArchiveSourceConfig};
pub use store::CoverageStore;
