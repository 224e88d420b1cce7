//! postcodes.io response types.
//!
//! See: <https://postcodes.io/docs>

use coverage_core::GeographicInfo;
use serde::Deserialize;

/// Envelope returned by `GET /postcodes/{postcode}`.
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    /// HTTP status echoed in the body.
    pub status: u16,
    /// Postcode record; absent or `null` when there is no match.
    #[serde(default)]
    pub result: Option<PostcodeRecord>,
}

/// The subset of a postcodes.io record the checker reports.
#[derive(Debug, Deserialize)]
pub struct PostcodeRecord {
    pub postcode: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub admin_district: Option<String>,
    pub parliamentary_constituency: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub eastings: Option<i64>,
    pub northings: Option<i64>,
}

impl From<PostcodeRecord> for GeographicInfo {
    fn from(record: PostcodeRecord) -> Self {
        Self {
            postcode: record.postcode,
            country: record.country,
            region: record.region,
            admin_district: record.admin_district,
            parliamentary_constituency: record.parliamentary_constituency,
            latitude: record.latitude,
            longitude: record.longitude,
            eastings: record.eastings,
            northings: record.northings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_full_record() {
        let json = r#"{
            "status": 200,
            "result": {
                "postcode": "SW1A 1AA",
                "quality": 1,
                "eastings": 529090,
                "northings": 179645,
                "country": "England",
                "longitude": -0.141588,
                "latitude": 51.501009,
                "region": "London",
                "parliamentary_constituency": "Cities of London and Westminster",
                "admin_district": "Westminster"
            }
        }"#;

        let response: LookupResponse = serde_json::from_str(json).expect("should deserialise");
        assert_eq!(response.status, 200);
        let info = GeographicInfo::from(response.result.expect("record present"));
        assert_eq!(info.postcode, "SW1A 1AA");
        assert_eq!(info.admin_district.as_deref(), Some("Westminster"));
        assert_eq!(info.eastings, Some(529_090));
    }

    #[test]
    fn deserialise_nulls_and_missing_result() {
        let json = r#"{
            "status": 200,
            "result": {
                "postcode": "GY1 1AA",
                "country": "Channel Islands",
                "region": null,
                "admin_district": null,
                "parliamentary_constituency": null,
                "latitude": null,
                "longitude": null,
                "eastings": null,
                "northings": null
            }
        }"#;
        let response: LookupResponse = serde_json::from_str(json).expect("should deserialise");
        let record = response.result.expect("record present");
        assert!(record.region.is_none() && record.latitude.is_none());

        let empty: LookupResponse =
            serde_json::from_str(r#"{"status": 200, "result": null}"#).expect("should deserialise");
        assert!(empty.result.is_none());
    }
}
