//! Pull the coverage CSV out of a downloaded ZIP archive.

use std::io::{self, BufWriter, Read, Seek, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use zip::ZipArchive;

use super::ExtractError;

/// Details of an extracted CSV entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCsv {
    /// Entry name inside the archive.
    pub entry_name: String,
    /// Bytes written to the destination.
    pub bytes_written: u64,
}

/// Extract the first `.csv` entry of `archive` to `destination`.
///
/// Entries are probed in archive order and matched case-insensitively. The
/// CSV is written to `{destination}.part` and renamed into place once the
/// write completes, so `destination` only ever holds a whole file.
///
/// # Errors
///
/// Returns [`ExtractError::MissingCsv`] when no entry qualifies, and
/// [`ExtractError::Archive`] or [`ExtractError::Write`] for unreadable
/// archives and failed writes.
pub fn extract_first_csv<R: Read + Seek>(
    archive: R,
    destination: &Utf8Path,
) -> Result<ExtractedCsv, ExtractError> {
    let mut archive = ZipArchive::new(archive).map_err(ExtractError::Archive)?;
    let index = find_csv_entry(&mut archive)?;
    let mut entry = archive.by_index(index).map_err(ExtractError::Archive)?;
    let entry_name = entry.name().to_owned();
    debug!("Extracting {entry_name} to {destination}");

    let part_path = Utf8PathBuf::from(format!("{destination}.part"));
    let bytes_written = match write_part(&mut entry, &part_path) {
        Ok(bytes) => bytes,
        Err(source) => {
            discard_part(&part_path);
            return Err(ExtractError::Write {
                path: part_path,
                source,
            });
        }
    };
    coverage_fs::rename_file(&part_path, destination).map_err(|source| {
        discard_part(&part_path);
        ExtractError::Write {
            path: destination.to_path_buf(),
            source,
        }
    })?;

    Ok(ExtractedCsv {
        entry_name,
        bytes_written,
    })
}

fn find_csv_entry<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<usize, ExtractError> {
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(ExtractError::Archive)?;
        if !entry.is_dir() && entry.name().to_ascii_lowercase().ends_with(".csv") {
            return Ok(index);
        }
    }
    Err(ExtractError::MissingCsv)
}

fn write_part(entry: &mut impl Read, part_path: &Utf8Path) -> io::Result<u64> {
    let file = coverage_fs::create_file(part_path)?;
    let mut writer = BufWriter::new(file);
    let bytes = io::copy(entry, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}

fn discard_part(part_path: &Utf8Path) {
    if let Err(err) = coverage_fs::remove_file_if_exists(part_path) {
        warn!("Failed to remove partial extract {part_path}: {err}");
    }
}
