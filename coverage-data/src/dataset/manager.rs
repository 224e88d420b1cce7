//! Dataset lifecycle: acquire, ingest and query.

use std::{
    ffi::OsString,
    io::{Seek, SeekFrom},
    path::PathBuf,
};

use camino::{Utf8Path, Utf8PathBuf};
use coverage_core::{CoverageQueryError, CoverageSource, PostcodeKey, RawCoverageRow};
use log::info;
use serde::Serialize;
use tokio::task;

use super::{
    ArchiveSource, CoverageStore, DEFAULT_BATCH_SIZE, DatasetError, EditionTable, IngestReport,
    extract_first_csv, ingest_csv,
};

/// File name of the indexed store inside the data directory.
pub const STORE_FILE_NAME: &str = "mobile.db";

/// Data directory used when none is configured, relative to the home
/// directory.
pub const DEFAULT_DATA_DIR: &str = ".mobile-coverage/data";

/// Resolve [`DEFAULT_DATA_DIR`] under `home`.
///
/// Returns `None` when `home` is unset or not valid UTF-8.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use coverage_data::dataset::default_data_dir;
///
/// let dir = default_data_dir(Some("/home/alice".into()));
/// assert_eq!(dir, Some(Utf8PathBuf::from("/home/alice/.mobile-coverage/data")));
/// assert_eq!(default_data_dir(None), None);
/// ```
#[must_use]
pub fn default_data_dir(home: Option<OsString>) -> Option<Utf8PathBuf> {
    let home = Utf8PathBuf::from_path_buf(PathBuf::from(home?)).ok()?;
    Some(home.join(DEFAULT_DATA_DIR))
}

/// Outcome of [`DatasetManager::setup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    /// Edition that was prepared.
    pub edition: String,
    /// Raw CSV artefact for the edition.
    pub csv_path: Utf8PathBuf,
    /// Indexed store path.
    pub store_path: Utf8PathBuf,
    /// Archive bytes downloaded, or `None` when the CSV was already present.
    pub downloaded_bytes: Option<u64>,
    /// Ingest summary, or `None` when the store was already present.
    pub ingest: Option<IngestReport>,
}

/// Owns the local coverage dataset for one data directory.
///
/// The directory holds one raw CSV per edition, which is kept, and a single
/// store built from whichever edition was ingested last. [`setup`] and
/// queries are expected to be temporally disjoint: run setup to completion
/// before serving checks.
///
/// [`setup`]: Self::setup
#[derive(Debug, Clone)]
pub struct DatasetManager {
    data_dir: Utf8PathBuf,
    editions: EditionTable,
    batch_size: usize,
    store: CoverageStore,
}

impl DatasetManager {
    /// Manage the dataset under `data_dir` with the default edition table.
    pub fn new(data_dir: impl Into<Utf8PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let store = CoverageStore::new(data_dir.join(STORE_FILE_NAME));
        Self {
            data_dir,
            editions: EditionTable::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            store,
        }
    }

    /// Replace the edition table.
    #[must_use]
    pub fn with_editions(mut self, editions: EditionTable) -> Self {
        self.editions = editions;
        self
    }

    /// Override the rows committed per ingest transaction.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Directory holding the dataset artefacts.
    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    /// Edition table in use.
    pub fn editions(&self) -> &EditionTable {
        &self.editions
    }

    /// Indexed store path.
    pub fn store_path(&self) -> &Utf8Path {
        self.store.path()
    }

    /// Raw CSV path for `edition`.
    pub fn csv_path(&self, edition: &str) -> Utf8PathBuf {
        self.data_dir.join(format!("ofcom_mobile_{edition}.csv"))
    }

    /// The read-only store handle.
    pub fn store(&self) -> &CoverageStore {
        &self.store
    }

    /// Make `edition` queryable locally.
    ///
    /// The archive is downloaded and its CSV extracted unless the CSV for
    /// `edition` already exists; the store is rebuilt unless it already
    /// exists. `force` redoes both steps. The edition is resolved before
    /// anything touches the disk or network.
    ///
    /// # Errors
    ///
    /// Any [`DatasetError`]; the caller should stop, as no partial dataset
    /// is usable.
    pub async fn setup<S: ArchiveSource + ?Sized>(
        &self,
        source: &S,
        edition: &str,
        force: bool,
    ) -> Result<SetupReport, DatasetError> {
        let url = self.editions.resolve(edition)?;
        coverage_fs::ensure_dir(&self.data_dir).map_err(|source| DatasetError::CreateDir {
            path: self.data_dir.clone(),
            source,
        })?;

        let csv_path = self.csv_path(edition);
        let downloaded_bytes = if force || !artefact_exists(&csv_path)? {
            Some(self.acquire(source, edition, url, &csv_path).await?)
        } else {
            info!("Coverage CSV already present at {csv_path}; skipping download");
            None
        };

        let store_path = self.store.path().to_path_buf();
        let ingest = if force || !artefact_exists(&store_path)? {
            Some(self.ingest(&csv_path).await?)
        } else {
            info!("Coverage store already present at {store_path}");
            None
        };

        Ok(SetupReport {
            edition: edition.to_owned(),
            csv_path,
            store_path,
            downloaded_bytes,
            ingest,
        })
    }

    async fn acquire<S: ArchiveSource + ?Sized>(
        &self,
        source: &S,
        edition: &str,
        url: &str,
        csv_path: &Utf8Path,
    ) -> Result<u64, DatasetError> {
        let mut archive = tempfile::Builder::new()
            .prefix(".ofcom-")
            .suffix(".zip")
            .tempfile_in(self.data_dir.as_std_path())
            .map_err(|source| DatasetError::StageArchive {
                path: self.data_dir.clone(),
                source,
            })?;

        info!("Downloading coverage edition {edition} from {url}");
        let bytes = source
            .download_archive(url, archive.as_file_mut())
            .await
            .map_err(|source| DatasetError::Download {
                edition: edition.to_owned(),
                source,
            })?;
        info!("Downloaded {bytes} bytes");

        archive
            .as_file_mut()
            .seek(SeekFrom::Start(0))
            .map_err(|source| DatasetError::StageArchive {
                path: self.data_dir.clone(),
                source,
            })?;
        let destination = csv_path.to_path_buf();
        let extracted = task::spawn_blocking(move || {
            extract_first_csv(archive.as_file_mut(), &destination)
                .map_err(|source| DatasetError::Extract {
                    path: destination.clone(),
                    source,
                })
        })
        .await
        .map_err(|source| DatasetError::Task { source })??;
        info!(
            "Extracted {} ({} bytes) to {csv_path}",
            extracted.entry_name, extracted.bytes_written
        );
        Ok(bytes)
    }

    async fn ingest(&self, csv_path: &Utf8Path) -> Result<IngestReport, DatasetError> {
        let csv_path = csv_path.to_path_buf();
        let store_path = self.store.path().to_path_buf();
        let batch_size = self.batch_size;
        task::spawn_blocking(move || {
            ingest_csv(&csv_path, &store_path, batch_size).map_err(|source| DatasetError::Ingest {
                path: store_path.clone(),
                source,
            })
        })
        .await
        .map_err(|source| DatasetError::Task { source })?
    }
}

impl CoverageSource for DatasetManager {
    fn query_postcode(
        &self,
        postcode: &PostcodeKey,
    ) -> Result<Option<RawCoverageRow>, CoverageQueryError> {
        self.store.query(postcode)
    }
}

fn artefact_exists(path: &Utf8Path) -> Result<bool, DatasetError> {
    coverage_fs::is_regular_file(path).map_err(|source| DatasetError::Inspect {
        path: path.to_path_buf(),
        source,
    })
}
