//! postcodes.io-backed implementation of [`coverage_core::GeoLookup`].
//!
//! [`HttpGeoLookup`] implements the synchronous `GeoLookup` trait by blocking
//! on its own multi-threaded Tokio runtime, so concurrent checks issued from
//! scoped threads progress independently.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use coverage_core::{GeoLookup, PostcodeKey};
//! use coverage_data::geocode::{HttpGeoLookup, HttpGeoLookupConfig};
//!
//! let config = HttpGeoLookupConfig::default().with_timeout(Duration::from_secs(5));
//! let geocoder = HttpGeoLookup::with_config(config)?;
//! let info = geocoder.lookup(&PostcodeKey::normalise("SW1A 1AA"))?;
//! println!("{:?}", info.admin_district);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod postcodes_io;
mod provider;

pub use provider::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpGeoLookup, HttpGeoLookupConfig};
