//! Bulk load of the coverage CSV into the indexed SQLite store.

use std::collections::HashSet;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use coverage_core::normalise_postcode;
use csv::{ReaderBuilder, StringRecord, StringRecordsIter};
use log::{debug, info, warn};
use rusqlite::{Connection, Statement, params_from_iter};
use serde::Serialize;

use super::IngestError;

/// Rows committed per transaction unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 50_000;
/// Name of the coverage table inside the store.
pub const TABLE_NAME: &str = "mobile";
/// Normalised name of the column holding postcodes.
pub const POSTCODE_COLUMN: &str = "postcode";

/// Summary of a completed ingest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IngestReport {
    /// Rows written to the store.
    pub rows: u64,
    /// Malformed records skipped.
    pub skipped_rows: u64,
    /// Store column names, in CSV header order.
    pub columns: Vec<String>,
}

/// Normalise a CSV header into a store column name.
///
/// Letters are lowercased and every other non-alphanumeric character
/// becomes `_`, so `"EE 4G"` and `"ee-4g"` both map to `ee_4g`.
///
/// # Examples
/// ```
/// use coverage_data::dataset::normalise_column_name;
///
/// assert_eq!(normalise_column_name(" Vodafone Voice "), "vodafone_voice");
/// assert_eq!(normalise_column_name("EE-4G(%)"), "ee_4g___");
/// ```
pub fn normalise_column_name(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() {
                ch.to_lowercase().next().unwrap_or(ch)
            } else {
                '_'
            }
        })
        .collect()
}

/// Derive unique, non-empty store column names from a CSV header.
///
/// Empty names become `column_{n}` (one-based position) and repeats gain a
/// `_{n}` suffix.
pub fn store_columns(header: &StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut name = normalise_column_name(raw);
            if name.is_empty() {
                name = format!("column_{}", index + 1);
            }
            let mut candidate = name.clone();
            let mut suffix = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{name}_{suffix}");
                suffix += 1;
            }
            candidate
        })
        .collect()
}

/// Rebuild the store at `store_path` from the CSV at `csv_path`.
///
/// The new store is built at `{store_path}.part` and renamed over
/// `store_path` once its index exists, so `store_path` only ever holds a
/// complete store. A failed build removes the part file and leaves any
/// previous store untouched. Records are inserted in transactions of
/// `batch_size` rows and the postcode index is created only after the final
/// commit. Records the CSV reader rejects are logged at debug level, counted
/// and skipped.
///
/// # Errors
///
/// Returns [`IngestError`] when the CSV cannot be read, lacks a postcode
/// column, SQLite rejects a schema, insert or commit, or the finished store
/// cannot be moved into place.
pub fn ingest_csv(
    csv_path: &Utf8Path,
    store_path: &Utf8Path,
    batch_size: usize,
) -> Result<IngestReport, IngestError> {
    let file = coverage_fs::open_utf8_file(csv_path).map_err(|source| IngestError::OpenCsv {
        path: csv_path.to_path_buf(),
        source,
    })?;
    info!("Building coverage store {store_path} from {csv_path}");
    ingest_reader(file, store_path, batch_size)
}

fn ingest_reader<R: Read>(
    input: R,
    store_path: &Utf8Path,
    batch_size: usize,
) -> Result<IngestReport, IngestError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);
    let columns = store_columns(reader.headers().map_err(IngestError::ReadCsv)?);
    let Some(postcode_index) = columns.iter().position(|name| name == POSTCODE_COLUMN) else {
        return Err(IngestError::MissingPostcodeColumn { columns });
    };

    let staging = part_path(store_path);
    remove_store_files(&staging)?;
    let built = build_store(
        &mut reader.records(),
        &staging,
        columns,
        postcode_index,
        batch_size,
    )
    .and_then(|report| {
        coverage_fs::rename_file(&staging, store_path)
            .map(|()| report)
            .map_err(|source| IngestError::PublishStore {
                path: store_path.to_path_buf(),
                source,
            })
    });
    if built.is_err() {
        discard_part(&staging);
    }
    let report = built?;

    info!(
        "Coverage store built with {} rows ({} skipped)",
        report.rows, report.skipped_rows
    );
    Ok(report)
}

/// Fill a fresh store at `path`; the connection is closed on return.
fn build_store<R: Read>(
    records: &mut StringRecordsIter<'_, R>,
    path: &Utf8Path,
    columns: Vec<String>,
    postcode_index: usize,
    batch_size: usize,
) -> Result<IngestReport, IngestError> {
    let mut connection = open_store(path)?;
    create_schema(&connection, &columns)?;

    let insert_sql = insert_statement(columns.len());
    let batch_size = batch_size.max(1);
    let mut report = IngestReport {
        columns,
        ..IngestReport::default()
    };

    loop {
        let transaction = connection
            .transaction()
            .map_err(IngestError::BeginTransaction)?;
        let exhausted = {
            let mut statement = transaction
                .prepare_cached(&insert_sql)
                .map_err(IngestError::PrepareInsert)?;
            load_batch(
                records,
                &mut statement,
                postcode_index,
                batch_size,
                &mut report,
            )?
        };
        transaction.commit().map_err(IngestError::Commit)?;
        if exhausted {
            break;
        }
        info!("Inserted {} rows...", report.rows);
    }

    connection
        .execute(
            &format!("CREATE INDEX IF NOT EXISTS idx_postcode ON {TABLE_NAME}({POSTCODE_COLUMN})"),
            [],
        )
        .map_err(IngestError::CreateIndex)?;
    connection
        .pragma_update_and_check(None, "journal_mode", "DELETE", |row| row.get::<_, String>(0))
        .map_err(|source| IngestError::Pragma {
            pragma: "journal_mode",
            source,
        })?;
    Ok(report)
}

fn part_path(store_path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{store_path}.part"))
}

/// Remove a store file together with its SQLite `-wal` and `-shm` sidecars.
fn remove_store_files(path: &Utf8Path) -> Result<(), IngestError> {
    for candidate in [
        path.to_path_buf(),
        Utf8PathBuf::from(format!("{path}-wal")),
        Utf8PathBuf::from(format!("{path}-shm")),
    ] {
        coverage_fs::remove_file_if_exists(&candidate).map_err(|source| {
            IngestError::RemoveStore {
                path: candidate.clone(),
                source,
            }
        })?;
    }
    Ok(())
}

fn discard_part(part_path: &Utf8Path) {
    if let Err(err) = remove_store_files(part_path) {
        warn!("Failed to remove partial store: {err}");
    }
}

fn open_store(store_path: &Utf8Path) -> Result<Connection, IngestError> {
    let connection =
        Connection::open(store_path.as_std_path()).map_err(|source| IngestError::OpenStore {
            path: store_path.to_path_buf(),
            source,
        })?;
    connection
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .map_err(|source| IngestError::Pragma {
            pragma: "journal_mode",
            source,
        })?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .map_err(|source| IngestError::Pragma {
            pragma: "synchronous",
            source,
        })?;
    Ok(connection)
}

fn create_schema(connection: &Connection, columns: &[String]) -> Result<(), IngestError> {
    let definitions = columns
        .iter()
        .map(|name| format!("\"{name}\" TEXT"))
        .collect::<Vec<_>>()
        .join(", ");
    connection
        .execute(
            &format!("CREATE TABLE IF NOT EXISTS {TABLE_NAME} ({definitions})"),
            [],
        )
        .map(|_| ())
        .map_err(IngestError::CreateSchema)
}

fn insert_statement(column_count: usize) -> String {
    let placeholders = vec!["?"; column_count].join(", ");
    format!("INSERT INTO {TABLE_NAME} VALUES ({placeholders})")
}

/// Insert up to `batch_size` records, returning whether the CSV is exhausted.
fn load_batch<R: Read>(
    records: &mut StringRecordsIter<'_, R>,
    statement: &mut Statement<'_>,
    postcode_index: usize,
    batch_size: usize,
    report: &mut IngestReport,
) -> Result<bool, IngestError> {
    let mut inserted = 0;
    while inserted < batch_size {
        let record = match records.next() {
            None => return Ok(true),
            Some(Ok(record)) => record,
            Some(Err(err)) if err.is_io_error() => return Err(IngestError::ReadCsv(err)),
            Some(Err(err)) => {
                debug!("Skipping malformed CSV record: {err}");
                report.skipped_rows += 1;
                continue;
            }
        };
        let values = record.iter().enumerate().map(|(index, value)| {
            if index == postcode_index {
                normalise_postcode(value)
            } else {
                value.to_owned()
            }
        });
        statement
            .execute(params_from_iter(values))
            .map_err(|source| IngestError::InsertRow {
                record: report.rows + report.skipped_rows + 1,
                source,
            })?;
        report.rows += 1;
        inserted += 1;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn write_csv(dir: &TempDir, contents: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("ofcom_mobile_2023.csv"))
            .expect("utf-8 path");
        std::fs::write(path.as_std_path(), contents).expect("write csv");
        path
    }

    fn store_path(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join("mobile.db")).expect("utf-8 path")
    }

    #[rstest]
    #[case("Postcode", "postcode")]
    #[case("EE 4G", "ee_4g")]
    #[case("three-voice", "three_voice")]
    #[case("\u{feff}postcode", "postcode")]
    #[case("  O2_5G  ", "o2_5g")]
    fn normalises_headers(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalise_column_name(raw), expected);
    }

    #[rstest]
    fn store_columns_fill_blanks_and_dedupe() {
        let header = StringRecord::from(vec!["Postcode", "", "EE 4G", "ee-4g", "EE_4G"]);
        assert_eq!(
            store_columns(&header),
            ["postcode", "column_2", "ee_4g", "ee_4g_2", "ee_4g_3"]
        );
    }

    #[rstest]
    fn ingest_normalises_postcodes_and_skips_bad_rows(temp_dir: TempDir) {
        let csv = write_csv(
            &temp_dir,
            "Postcode,EE 4G,O2 4G\n\
             sw1a 1aa,1.0,0.4\n\
             EC1A 1BB,0.2\n\
             ls1 1aa,0.9,0.9\n",
        );
        let store = store_path(&temp_dir);

        let report = ingest_csv(&csv, &store, 1).expect("ingest");

        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.columns, ["postcode", "ee_4g", "o2_4g"]);

        let conn = Connection::open(store.as_std_path()).expect("open store");
        let postcodes: Vec<String> = conn
            .prepare("SELECT postcode FROM mobile ORDER BY rowid")
            .expect("prepare")
            .query_map([], |row| row.get(0))
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("collect");
        assert_eq!(postcodes, ["SW1A1AA", "LS11AA"]);

        let index_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_postcode'",
                [],
                |row| row.get(0),
            )
            .expect("count indexes");
        assert_eq!(index_count, 1);
    }

    #[rstest]
    fn ingest_replaces_previous_store(temp_dir: TempDir) {
        let store = store_path(&temp_dir);
        let first = write_csv(&temp_dir, "postcode,ee_4g\nAB1 2CD,0.1\nAB1 2CE,0.2\n");
        ingest_csv(&first, &store, DEFAULT_BATCH_SIZE).expect("first ingest");

        let second = write_csv(&temp_dir, "postcode,ee_5g\nZE1 0AA,0.7\n");
        let report = ingest_csv(&second, &store, DEFAULT_BATCH_SIZE).expect("second ingest");
        assert_eq!(report.rows, 1);

        let conn = Connection::open(store.as_std_path()).expect("open store");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM mobile", [], |row| row.get(0))
            .expect("count rows");
        assert_eq!(count, 1);
    }

    /// Yields `contents`, then fails with an I/O error instead of EOF.
    struct FailingAfter<'a> {
        contents: &'a [u8],
    }

    impl Read for FailingAfter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.contents.is_empty() {
                return Err(io::Error::other("connection reset"));
            }
            self.contents.read(buf)
        }
    }

    fn files_in(dir: &TempDir) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| {
                entry
                    .expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    #[rstest]
    fn failed_ingest_leaves_no_store_behind(temp_dir: TempDir) {
        let store = store_path(&temp_dir);
        let input = FailingAfter {
            contents: b"postcode,ee_4g\nSW1A 1AA,0.9\nEC1A 1BB,0.8\nLS1 1AA,0.7\n",
        };

        let err = ingest_reader(input, &store, 1).expect_err("read fails mid-ingest");

        assert!(matches!(err, IngestError::ReadCsv(_)), "{err:?}");
        assert!(files_in(&temp_dir).is_empty(), "{:?}", files_in(&temp_dir));
    }

    #[rstest]
    fn failed_rebuild_keeps_the_previous_store(temp_dir: TempDir) {
        let store = store_path(&temp_dir);
        let first = write_csv(&temp_dir, "postcode,ee_4g\nAB1 2CD,0.1\n");
        ingest_csv(&first, &store, DEFAULT_BATCH_SIZE).expect("first ingest");

        let input = FailingAfter {
            contents: b"postcode,ee_4g\nZE1 0AA,0.7\n",
        };
        ingest_reader(input, &store, 1).expect_err("rebuild fails");

        assert_eq!(files_in(&temp_dir), ["mobile.db", "ofcom_mobile_2023.csv"]);
        let conn = Connection::open(store.as_std_path()).expect("open store");
        let postcode: String = conn
            .query_row("SELECT postcode FROM mobile", [], |row| row.get(0))
            .expect("previous row");
        assert_eq!(postcode, "AB12CD");
    }

    #[rstest]
    fn stale_part_file_is_replaced(temp_dir: TempDir) {
        let store = store_path(&temp_dir);
        std::fs::write(part_path(&store).as_std_path(), b"half a database").expect("write part");
        let csv = write_csv(&temp_dir, "postcode,ee_4g\nAB1 2CD,0.1\n");

        let report = ingest_csv(&csv, &store, DEFAULT_BATCH_SIZE).expect("ingest");

        assert_eq!(report.rows, 1);
        assert_eq!(files_in(&temp_dir), ["mobile.db", "ofcom_mobile_2023.csv"]);
    }

    #[rstest]
    fn header_without_postcode_is_rejected(temp_dir: TempDir) {
        let csv = write_csv(&temp_dir, "pcd,ee_4g\nSW1A1AA,1.0\n");
        let err = ingest_csv(&csv, &store_path(&temp_dir), DEFAULT_BATCH_SIZE)
            .expect_err("postcode column is required");
        match err {
            IngestError::MissingPostcodeColumn { columns } => {
                assert_eq!(columns, ["pcd", "ee_4g"]);
            }
            other => panic!("expected missing postcode column, got {other:?}"),
        }
    }

    #[rstest]
    fn missing_csv_is_an_open_error(temp_dir: TempDir) {
        let csv = Utf8PathBuf::from_path_buf(temp_dir.path().join("absent.csv"))
            .expect("utf-8 path");
        let err = ingest_csv(&csv, &store_path(&temp_dir), DEFAULT_BATCH_SIZE)
            .expect_err("csv is missing");
        assert!(matches!(err, IngestError::OpenCsv { .. }), "{err:?}");
    }
}
