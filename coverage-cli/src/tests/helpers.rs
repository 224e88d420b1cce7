//! Test helpers for temporary data directories and sample archives.

use std::sync::Arc;

use camino::Utf8PathBuf;
use coverage_core::test_support::StubGeoLookup;
use coverage_data::dataset::test_support::{StubArchiveSource, zip_archive};
use tempfile::TempDir;

use super::*;
use crate::check::{CheckConfig, GeocoderBuilder, SharedGeocoder};

pub(super) const SAMPLE_CSV: &str = "Postcode,EE Voice,EE 4G,EE 5G,O2 4G,Three 4G,Vodafone 4G\n\
    SW1A 1AA,0.95,0.8,0.1,0.7,0.2,0.9\n\
    EC1A 1BB,1.0,1.0,1.0,1.0,1.0,1.0\n";

/// Temporary data directory that lives as long as the value.
pub(super) struct DataDir {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl DataDir {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("data")).expect("utf-8 tempdir");
        Self { _dir: dir, path }
    }

    pub(super) fn path(&self) -> &Utf8PathBuf {
        &self.path
    }
}

pub(super) fn sample_source() -> StubArchiveSource {
    StubArchiveSource::new(zip_archive(&[("mobile_postcode_2023.csv", SAMPLE_CSV)]))
}

/// Geocoder builder that hands out a shared stub.
pub(super) struct StubGeocoderBuilder {
    pub(super) geocoder: Arc<StubGeoLookup>,
}

impl StubGeocoderBuilder {
    pub(super) fn accepting(postcodes: &[&str]) -> Self {
        Self {
            geocoder: Arc::new(StubGeoLookup::accepting(postcodes)),
        }
    }
}

impl GeocoderBuilder for StubGeocoderBuilder {
    fn build(&self, _config: &CheckConfig) -> Result<SharedGeocoder, CliError> {
        Ok(self.geocoder.clone())
    }
}

pub(super) fn output_text(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).expect("output utf-8")
}
