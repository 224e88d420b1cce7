//! Error types produced while preparing and querying the coverage dataset.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort [`DatasetManager::setup`](super::DatasetManager::setup).
///
/// There is no meaningful partial dataset, so every variant is fatal to the
/// setup in flight.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    /// The requested edition is not in the manager's edition table.
    #[error("unknown dataset edition {edition:?}; available: {}", .available.join(", "))]
    UnknownEdition {
        /// Edition that was requested.
        edition: String,
        /// Editions the table does know about, in sorted order.
        available: Vec<String>,
    },
    /// Creating the data directory failed.
    #[error("failed to create data directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Inspecting an existing artefact failed.
    #[error("failed to inspect {path}: {source}")]
    Inspect {
        /// Path being inspected.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Creating the temporary archive file failed.
    #[error("failed to stage archive in {path}: {source}")]
    StageArchive {
        /// Directory the archive was staged in.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The archive could not be downloaded.
    #[error("failed to download edition {edition}: {source}")]
    Download {
        /// Edition being downloaded.
        edition: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },
    /// The downloaded archive could not be unpacked.
    #[error("failed to extract coverage CSV to {path}: {source}")]
    Extract {
        /// Destination CSV path.
        path: Utf8PathBuf,
        /// Extraction failure.
        #[source]
        source: ExtractError,
    },
    /// Building the indexed store failed.
    #[error("failed to build coverage store {path}: {source}")]
    Ingest {
        /// Store path being built.
        path: Utf8PathBuf,
        /// Ingestion failure.
        #[source]
        source: IngestError,
    },
    /// A blocking setup step panicked or was cancelled.
    #[error("dataset task failed: {source}")]
    Task {
        /// Join failure reported by Tokio.
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Transport-level errors encountered while fetching an archive.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description.
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The request failed at the network layer or the sink rejected bytes.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport or sink.
        #[source]
        source: io::Error,
    },
}

/// Errors raised while pulling the coverage CSV out of a ZIP archive.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// The archive is not a readable ZIP file.
    #[error("failed to read ZIP archive: {0}")]
    Archive(#[source] zip::result::ZipError),
    /// No entry in the archive ends in `.csv`.
    #[error("no CSV found inside archive")]
    MissingCsv,
    /// Writing the extracted CSV failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File being written.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Errors raised while loading the coverage CSV into SQLite.
///
/// Malformed records are not errors; they are skipped and counted in
/// [`IngestReport::skipped_rows`](super::IngestReport::skipped_rows).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    /// Opening the CSV file failed.
    #[error("failed to open CSV {path}: {source}")]
    OpenCsv {
        /// CSV path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading the CSV failed at the I/O layer or its header was unreadable.
    #[error("failed to read CSV: {0}")]
    ReadCsv(#[source] csv::Error),
    /// The header has no column normalising to `postcode`.
    #[error("CSV header has no postcode column (columns: {})", .columns.join(", "))]
    MissingPostcodeColumn {
        /// Normalised column names found in the header.
        columns: Vec<String>,
    },
    /// Removing a stale store file failed.
    #[error("failed to remove stale store file {path}: {source}")]
    RemoveStore {
        /// Store path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Opening the SQLite store failed.
    #[error("failed to open SQLite store {path}: {source}")]
    OpenStore {
        /// Store path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Applying a connection pragma failed.
    #[error("failed to set PRAGMA {pragma}: {source}")]
    Pragma {
        /// Pragma being applied.
        pragma: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the coverage table failed.
    #[error("failed to create coverage table: {0}")]
    CreateSchema(#[source] rusqlite::Error),
    /// Beginning a batch transaction failed.
    #[error("failed to begin ingest transaction: {0}")]
    BeginTransaction(#[source] rusqlite::Error),
    /// Preparing the insert statement failed.
    #[error("failed to prepare insert statement: {0}")]
    PrepareInsert(#[source] rusqlite::Error),
    /// Writing a row failed.
    #[error("failed to insert CSV record {record}: {source}")]
    InsertRow {
        /// One-based record number, excluding the header.
        record: u64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Committing a batch failed.
    #[error("failed to commit ingest batch: {0}")]
    Commit(#[source] rusqlite::Error),
    /// Building the postcode index failed.
    #[error("failed to create postcode index: {0}")]
    CreateIndex(#[source] rusqlite::Error),
    /// Moving the finished store into place failed.
    #[error("failed to move finished store to {path}: {source}")]
    PublishStore {
        /// Final store path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
