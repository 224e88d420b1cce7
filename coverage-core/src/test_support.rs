//! Deterministic test doubles for the checker seams.
//!
//! Both stubs count their calls so tests can assert which collaborators a
//! check touched, and [`StubGeoLookup`] can delay individual postcodes to
//! skew completion order in batch checks.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use crate::{
    CoverageQueryError, CoverageSource, GeoLookup, GeoLookupError, GeographicInfo, PostcodeKey,
    RawCoverageRow,
};

/// Stub [`GeoLookup`] accepting a fixed set of postcodes.
///
/// Unknown postcodes are reported as [`GeoLookupError::NotFound`], matching
/// how the postcodes.io client answers a 404.
#[derive(Debug, Default)]
pub struct StubGeoLookup {
    accepted: HashSet<PostcodeKey>,
    failure: Option<GeoLookupError>,
    delays: HashMap<PostcodeKey, Duration>,
    calls: AtomicUsize,
}

impl StubGeoLookup {
    /// Accept exactly `postcodes`; every other key is reported as not found.
    #[must_use]
    pub fn accepting<I, P>(postcodes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        Self {
            accepted: postcodes
                .into_iter()
                .map(|postcode| PostcodeKey::normalise(postcode.as_ref()))
                .collect(),
            ..Self::default()
        }
    }

    /// Fail every lookup with `error`.
    #[must_use]
    pub fn failing(error: GeoLookupError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Sleep for `delay` before answering lookups of `postcode`.
    #[must_use]
    pub fn with_delay(mut self, postcode: &str, delay: Duration) -> Self {
        self.delays.insert(PostcodeKey::normalise(postcode), delay);
        self
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeoLookup for StubGeoLookup {
    fn lookup(&self, postcode: &PostcodeKey) -> Result<GeographicInfo, GeoLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(postcode) {
            thread::sleep(*delay);
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if !self.accepted.contains(postcode) {
            return Err(GeoLookupError::NotFound {
                postcode: postcode.to_string(),
            });
        }
        Ok(GeographicInfo {
            postcode: postcode.to_string(),
            country: Some("England".to_owned()),
            region: Some("London".to_owned()),
            admin_district: Some("Westminster".to_owned()),
            latitude: Some(51.501_009),
            longitude: Some(-0.141_588),
            ..GeographicInfo::default()
        })
    }
}

/// Stub [`CoverageSource`] backed by in-memory rows.
#[derive(Debug, Default)]
pub struct StubCoverageSource {
    rows: HashMap<PostcodeKey, RawCoverageRow>,
    failure: Option<CoverageQueryError>,
    calls: AtomicUsize,
}

impl StubCoverageSource {
    /// Serve `rows`, keyed by their normalised `postcode` column.
    #[must_use]
    pub fn with_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RawCoverageRow>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| {
                    let key = PostcodeKey::normalise(row.get("postcode").unwrap_or_default());
                    (key, row)
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Fail every query with `error`.
    #[must_use]
    pub fn failing(error: CoverageQueryError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Number of queries performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CoverageSource for StubCoverageSource {
    fn query_postcode(
        &self,
        postcode: &PostcodeKey,
    ) -> Result<Option<RawCoverageRow>, CoverageQueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.rows.get(postcode).cloned())
    }
}
