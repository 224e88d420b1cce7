//! Geocoder trait and the geographic attributes it returns.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::PostcodeKey;

use super::error::GeoLookupError;

/// Geographic attributes for a postcode, as reported by the geocoder.
///
/// Optional fields are `None` when the geocoder reports them as null, which
/// happens for some Crown Dependency and newly issued postcodes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeographicInfo {
    /// Postcode in the geocoder's canonical spelling (e.g. `SW1A 1AA`).
    pub postcode: String,
    /// Constituent country.
    pub country: Option<String>,
    /// Region.
    pub region: Option<String>,
    /// Local authority district.
    pub admin_district: Option<String>,
    /// Westminster constituency.
    pub parliamentary_constituency: Option<String>,
    /// WGS84 latitude.
    pub latitude: Option<f64>,
    /// WGS84 longitude.
    pub longitude: Option<f64>,
    /// OSGB36 easting.
    pub eastings: Option<i64>,
    /// OSGB36 northing.
    pub northings: Option<i64>,
}

/// Resolve a postcode to geographic attributes.
///
/// Implementations distinguish an invalid postcode
/// ([`GeoLookupError::NotFound`]) from transport failures so callers can
/// report the two differently.
///
/// # Examples
///
/// ```rust
/// use coverage_core::{GeoLookup, GeoLookupError, GeographicInfo, PostcodeKey};
///
/// struct Westminster;
///
/// impl GeoLookup for Westminster {
///     fn lookup(&self, postcode: &PostcodeKey) -> Result<GeographicInfo, GeoLookupError> {
///         if postcode.as_str() != "SW1A1AA" {
///             return Err(GeoLookupError::NotFound {
///                 postcode: postcode.to_string(),
///             });
///         }
///         Ok(GeographicInfo {
///             postcode: "SW1A 1AA".into(),
///             region: Some("London".into()),
///             ..GeographicInfo::default()
///         })
///     }
/// }
///
/// let info = Westminster.lookup(&PostcodeKey::normalise("sw1a 1aa"))?;
/// assert_eq!(info.region.as_deref(), Some("London"));
/// # Ok::<(), GeoLookupError>(())
/// ```
pub trait GeoLookup {
    /// Look up `postcode`.
    fn lookup(&self, postcode: &PostcodeKey) -> Result<GeographicInfo, GeoLookupError>;
}

impl<T: GeoLookup + ?Sized> GeoLookup for &T {
    fn lookup(&self, postcode: &PostcodeKey) -> Result<GeographicInfo, GeoLookupError> {
        (**self).lookup(postcode)
    }
}

impl<T: GeoLookup + ?Sized> GeoLookup for std::sync::Arc<T> {
    fn lookup(&self, postcode: &PostcodeKey) -> Result<GeographicInfo, GeoLookupError> {
        (**self).lookup(postcode)
    }
}
