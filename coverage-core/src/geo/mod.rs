//! Resolve postcodes to geographic attributes.
//!
//! The `GeoLookup` trait abstracts the geocoding service consulted before
//! any coverage data is read. A failed lookup marks the postcode invalid and
//! stops the check early.

mod error;
mod lookup;

pub use error::GeoLookupError;
pub use lookup::{GeoLookup, GeographicInfo};
