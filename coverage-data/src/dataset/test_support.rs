//! Shared fixtures for dataset tests.
use std::future::Future;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{ArchiveSource, TransportError};

/// Build an in-memory ZIP archive holding `entries` in order.
///
/// # Panics
///
/// Panics if the ZIP writer fails, which only happens on allocation failure.
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, contents) in entries {
        writer
            .start_file(*name, options)
            .unwrap_or_else(|err| panic!("failed to start ZIP entry {name}: {err}"));
        writer
            .write_all(contents.as_bytes())
            .unwrap_or_else(|err| panic!("failed to write ZIP entry {name}: {err}"));
    }
    writer
        .finish()
        .unwrap_or_else(|err| panic!("failed to finish ZIP archive: {err}"))
        .into_inner()
}

/// Drive a future to completion on a fresh multi-threaded runtime.
///
/// # Panics
///
/// Panics if the runtime cannot be built.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap_or_else(|err| panic!("failed to build Tokio runtime: {err}"))
        .block_on(future)
}

/// Stub [`ArchiveSource`] serving fixed bytes or a fixed HTTP failure.
#[derive(Debug, Default)]
pub struct StubArchiveSource {
    archive: Vec<u8>,
    failure_status: Option<u16>,
    calls: AtomicUsize,
}

impl StubArchiveSource {
    /// Serve `archive` for every URL.
    pub fn new(archive: Vec<u8>) -> Self {
        Self {
            archive,
            ..Self::default()
        }
    }

    /// Fail every download with HTTP `status`.
    pub fn failing_with_status(status: u16) -> Self {
        Self {
            failure_status: Some(status),
            ..Self::default()
        }
    }

    /// Number of downloads requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait(?Send)]
impl ArchiveSource for StubArchiveSource {
    async fn download_archive(
        &self,
        url: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failure_status {
            return Err(TransportError::Http {
                url: url.to_owned(),
                status,
                message: format!("stub failure {status}"),
            });
        }
        sink.write_all(&self.archive)
            .map_err(|source| TransportError::Network {
                url: url.to_owned(),
                source,
            })?;
        Ok(self.archive.len() as u64)
    }
}
