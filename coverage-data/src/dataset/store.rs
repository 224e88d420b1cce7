//! Read-only queries against the indexed coverage store.

use camino::{Utf8Path, Utf8PathBuf};
use coverage_core::{CoverageQueryError, CoverageSource, PostcodeKey, RawCoverageRow};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};

use super::{POSTCODE_COLUMN, TABLE_NAME};

/// Handle on the SQLite store built by [`ingest_csv`](super::ingest_csv).
///
/// Each query opens its own read-only connection, so a store can serve
/// concurrent checks from many threads without locking.
#[derive(Debug, Clone)]
pub struct CoverageStore {
    path: Utf8PathBuf,
}

impl CoverageStore {
    /// Refer to the store at `path`. The file need not exist yet.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the store file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Fetch the row for `postcode`, omitting null-valued columns.
    ///
    /// When the dataset holds several rows for one postcode, which of them
    /// is returned is unspecified.
    ///
    /// # Errors
    ///
    /// [`CoverageQueryError::Unavailable`] when the store file is missing,
    /// [`CoverageQueryError::Backend`] when SQLite cannot read it.
    pub fn query(&self, postcode: &PostcodeKey) -> Result<Option<RawCoverageRow>, CoverageQueryError> {
        let present = coverage_fs::is_regular_file(&self.path).map_err(backend)?;
        if !present {
            return Err(CoverageQueryError::Unavailable {
                path: self.path.as_std_path().to_path_buf(),
            });
        }

        let connection = Connection::open_with_flags(
            self.path.as_std_path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(backend)?;
        let mut statement = connection
            .prepare(&format!(
                "SELECT * FROM {TABLE_NAME} WHERE {POSTCODE_COLUMN} = ?1 LIMIT 1"
            ))
            .map_err(backend)?;
        let columns: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        let mut rows = statement.query([postcode.as_str()]).map_err(backend)?;
        match rows.next().map_err(backend)? {
            Some(row) => read_row(row, &columns).map(Some),
            None => Ok(None),
        }
    }
}

impl CoverageSource for CoverageStore {
    fn query_postcode(
        &self,
        postcode: &PostcodeKey,
    ) -> Result<Option<RawCoverageRow>, CoverageQueryError> {
        self.query(postcode)
    }
}

fn read_row(row: &Row<'_>, columns: &[String]) -> Result<RawCoverageRow, CoverageQueryError> {
    let mut raw = RawCoverageRow::new();
    for (index, name) in columns.iter().enumerate() {
        let value = match row.get_ref(index).map_err(backend)? {
            ValueRef::Null => continue,
            ValueRef::Integer(value) => value.to_string(),
            ValueRef::Real(value) => value.to_string(),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                String::from_utf8_lossy(bytes).into_owned()
            }
        };
        raw.insert(name.clone(), value);
    }
    Ok(raw)
}

fn backend(err: impl std::fmt::Display) -> CoverageQueryError {
    CoverageQueryError::Backend {
        message: err.to_string(),
    }
}
