//! Archive sources for dataset acquisition.

use std::io::{self, Write};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};

use super::TransportError;
use crate::error::ClientBuildError;

/// Default user agent for archive downloads.
pub const DEFAULT_USER_AGENT: &str = "mobile-coverage-dataset/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Fetches a dataset archive by URL.
#[async_trait(?Send)]
pub trait ArchiveSource {
    /// Stream the archive at `url` into `sink`, returning the bytes written.
    async fn download_archive(
        &self,
        url: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError>;
}

/// Configuration for [`HttpArchiveSource`].
#[derive(Debug, Clone)]
pub struct HttpArchiveSourceConfig {
    /// Whole-request timeout. Archives run to hundreds of megabytes.
    pub timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpArchiveSourceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpArchiveSourceConfig {
    /// Set the whole-request timeout.
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

/// HTTP implementation of [`ArchiveSource`].
#[derive(Debug)]
pub struct HttpArchiveSource {
    client: Client,
    config: HttpArchiveSourceConfig,
}

impl HttpArchiveSource {
    /// Construct a source with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new() -> Result<Self, ClientBuildError> {
        Self::with_config(HttpArchiveSourceConfig::default())
    }

    /// Construct a source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_config(config: HttpArchiveSourceConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        Ok(Self { client, config })
    }

    async fn call(&self, url: &str) -> Result<Response, TransportError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return TransportError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        TransportError::Network {
            url: url.to_owned(),
            source: io::Error::other(error.to_string()),
        }
    }
}

#[async_trait(?Send)]
impl ArchiveSource for HttpArchiveSource {
    async fn download_archive(
        &self,
        url: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError> {
        let mut response = self.call(url).await?;
        let mut written = 0_u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
        {
            sink.write_all(&chunk)
                .map_err(|source| TransportError::Network {
                    url: url.to_owned(),
                    source,
                })?;
            written += chunk.len() as u64;
        }
        sink.flush().map_err(|source| TransportError::Network {
            url: url.to_owned(),
            source,
        })?;
        Ok(written)
    }
}
