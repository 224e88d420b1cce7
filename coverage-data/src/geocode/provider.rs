//! HTTP geocoder using the postcodes.io lookup endpoint.

use std::time::Duration;

use coverage_core::{GeoLookup, GeoLookupError, GeographicInfo, PostcodeKey};
use reqwest::{Client, StatusCode, Url};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::postcodes_io::LookupResponse;
use crate::error::ClientBuildError;

/// Public postcodes.io endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.postcodes.io";

/// Default user agent for geocoding requests.
pub const DEFAULT_USER_AGENT: &str = "mobile-coverage-geocode/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`HttpGeoLookup`].
#[derive(Debug, Clone)]
pub struct HttpGeoLookupConfig {
    /// Base URL of the postcodes.io deployment.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpGeoLookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpGeoLookupConfig {
    /// Create a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// postcodes.io client implementing [`GeoLookup`].
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, and inside a `current_thread` runtime, the
/// client blocks on its own multi-threaded runtime. Inside a multi-threaded
/// runtime it uses [`tokio::task::block_in_place`] on the caller's handle
/// to avoid nested runtime panics.
pub struct HttpGeoLookup {
    client: Client,
    config: HttpGeoLookupConfig,
    base_url: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpGeoLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGeoLookup")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("base_url", &self.base_url.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpGeoLookup {
    /// Create a client against the public postcodes.io endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new() -> Result<Self, ClientBuildError> {
        Self::with_config(HttpGeoLookupConfig::default())
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry path segments, or if the
    /// HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpGeoLookupConfig) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("geocode")
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            base_url,
            runtime,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &HttpGeoLookupConfig {
        &self.config
    }

    /// Build the lookup URL: `{base_url}/postcodes/{postcode}`, with the key
    /// percent-encoded as a single path segment.
    fn lookup_url(&self, postcode: &PostcodeKey) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("postcodes")
                .push(postcode.as_str());
        }
        url.into()
    }

    async fn lookup_async(&self, postcode: &PostcodeKey) -> Result<GeographicInfo, GeoLookupError> {
        let url = self.lookup_url(postcode);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(not_found(postcode));
        }
        let response = response
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let body: LookupResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                self.convert_reqwest_error(&err, &url)
            } else {
                GeoLookupError::Parse {
                    message: err.to_string(),
                }
            }
        })?;
        body.result
            .map(GeographicInfo::from)
            .ok_or_else(|| not_found(postcode))
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> GeoLookupError {
        if error.is_timeout() {
            return GeoLookupError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return GeoLookupError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        GeoLookupError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let invalid = |message: String| ClientBuildError::BaseUrl {
        url: raw.to_owned(),
        message,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_owned()));
    }
    Ok(url)
}

/// Keys postcodes.io could resolve contain only ASCII letters and digits.
fn is_lookup_key(postcode: &PostcodeKey) -> bool {
    postcode.chars().all(|ch| ch.is_ascii_alphanumeric())
}

fn not_found(postcode: &PostcodeKey) -> GeoLookupError {
    GeoLookupError::NotFound {
        postcode: postcode.to_string(),
    }
}

impl GeoLookup for HttpGeoLookup {
    fn lookup(&self, postcode: &PostcodeKey) -> Result<GeographicInfo, GeoLookupError> {
        if postcode.is_empty() {
            return Err(GeoLookupError::EmptyPostcode);
        }
        if !is_lookup_key(postcode) {
            return Err(not_found(postcode));
        }

        let future = self.lookup_async(postcode);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one canned HTTP response on a loopback port.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut line = String::new();
            while reader.read_line(&mut line).expect("read request") > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let mut stream = stream;
            write!(
                stream,
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .expect("write response");
        });
        format!("http://{addr}")
    }

    fn geocoder(base_url: String) -> HttpGeoLookup {
        HttpGeoLookup::with_config(
            HttpGeoLookupConfig::new(base_url).with_timeout(Duration::from_secs(5)),
        )
        .expect("geocoder should build")
    }

    #[fixture]
    fn westminster() -> PostcodeKey {
        PostcodeKey::normalise("sw1a 1aa")
    }

    #[rstest]
    fn lookup_url_strips_trailing_slash(westminster: PostcodeKey) {
        let provider = geocoder("https://api.postcodes.io/".to_owned());
        assert_eq!(
            provider.lookup_url(&westminster),
            "https://api.postcodes.io/postcodes/SW1A1AA"
        );
    }

    #[rstest]
    #[case("https://api.postcodes.io", "https://api.postcodes.io/postcodes/")]
    #[case("http://127.0.0.1:8000/v1/", "http://127.0.0.1:8000/v1/postcodes/")]
    fn lookup_url_encodes_the_key_as_one_segment(#[case] base: &str, #[case] prefix: &str) {
        let provider = geocoder(base.to_owned());
        let url = provider.lookup_url(&PostcodeKey::normalise("sw1a1aa?x/../admin"));
        assert_eq!(url, format!("{prefix}SW1A1AA%3FX%2F..%2FADMIN"));
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:someone@example.com")]
    fn unusable_base_url_fails_to_build(#[case] base: &str) {
        let err = HttpGeoLookup::with_config(HttpGeoLookupConfig::new(base))
            .expect_err("base URL should be rejected");
        assert!(matches!(err, ClientBuildError::BaseUrl { .. }), "{err:?}");
    }

    #[rstest]
    #[case("SW1A1AA?X")]
    #[case("..")]
    #[case("SW1A/1AA")]
    fn keys_with_punctuation_are_rejected_without_a_request(#[case] raw: &str) {
        let provider = geocoder("http://127.0.0.1:9".to_owned());
        let err = provider
            .lookup(&PostcodeKey::normalise(raw))
            .expect_err("punctuated key");
        assert!(err.is_invalid_postcode(), "{err:?}");
        assert!(matches!(err, GeoLookupError::NotFound { .. }), "{err:?}");
    }

    #[rstest]
    fn default_config_targets_postcodes_io() {
        let config = HttpGeoLookupConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[rstest]
    fn empty_postcode_is_rejected_without_a_request() {
        let provider = geocoder("http://127.0.0.1:9".to_owned());
        let err = provider
            .lookup(&PostcodeKey::normalise("   "))
            .expect_err("empty postcode");
        assert_eq!(err, GeoLookupError::EmptyPostcode);
    }

    #[rstest]
    fn success_maps_record(westminster: PostcodeKey) {
        let base = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"status":200,"result":{"postcode":"SW1A 1AA","country":"England","region":"London","admin_district":"Westminster","parliamentary_constituency":null,"latitude":51.501009,"longitude":-0.141588,"eastings":529090,"northings":179645}}"#,
        );
        let info = geocoder(base).lookup(&westminster).expect("lookup succeeds");
        assert_eq!(info.postcode, "SW1A 1AA");
        assert_eq!(info.region.as_deref(), Some("London"));
        assert_eq!(info.northings, Some(179_645));
    }

    #[rstest]
    fn not_found_status_is_invalid_postcode(westminster: PostcodeKey) {
        let base = serve_once(
            "HTTP/1.1 404 Not Found",
            r#"{"status":404,"error":"Invalid postcode"}"#,
        );
        let err = geocoder(base).lookup(&westminster).expect_err("404");
        assert!(err.is_invalid_postcode(), "{err:?}");
    }

    #[rstest]
    fn server_error_is_http_error(westminster: PostcodeKey) {
        let base = serve_once("HTTP/1.1 502 Bad Gateway", "{}");
        let err = geocoder(base).lookup(&westminster).expect_err("502");
        match err {
            GeoLookupError::Http { status, .. } => assert_eq!(status, 502),
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[rstest]
    fn null_result_is_not_found(westminster: PostcodeKey) {
        let base = serve_once("HTTP/1.1 200 OK", r#"{"status":200,"result":null}"#);
        let err = geocoder(base).lookup(&westminster).expect_err("no record");
        assert!(matches!(err, GeoLookupError::NotFound { .. }), "{err:?}");
    }

    #[rstest]
    fn malformed_body_is_parse_error(westminster: PostcodeKey) {
        let base = serve_once("HTTP/1.1 200 OK", "not json");
        let err = geocoder(base).lookup(&westminster).expect_err("bad body");
        assert!(matches!(err, GeoLookupError::Parse { .. }), "{err:?}");
    }

    #[rstest]
    fn refused_connection_is_network_error(westminster: PostcodeKey) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        let err = geocoder(format!("http://{addr}"))
            .lookup(&westminster)
            .expect_err("nothing listening");
        assert!(matches!(err, GeoLookupError::Network { .. }), "{err:?}");
    }
}
