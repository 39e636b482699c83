//! HTTP client wrapper shared by the crawler, resolver, and download engine.
//!
//! A thin layer over reqwest that pins the request headers (fixed User-Agent,
//! `Connection: close`) and the per-request timeout. One call performs exactly
//! one outbound request; retry policy, if any, belongs to callers. Re-running
//! the pipeline is the retry mechanism, so none is implemented here.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Fixed User-Agent sent on every outbound request.
fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("podscrape/{version} (podcast-mirroring-tool)")
}

/// Errors that can occur while fetching a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed to fetch.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

/// HTTP client with fixed headers and a per-request timeout.
///
/// Created once and cloned freely; the inner reqwest client shares its
/// connection state across clones.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with the default 5 second per-request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with an explicit per-request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeout(timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        let client = Client::builder()
            .user_agent(default_user_agent())
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Issues a single GET and returns the streaming response.
    ///
    /// The response status is NOT checked here; streaming consumers (the
    /// download engine) decide what a non-200 means for their job.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] for unparseable URLs and
    /// [`FetchError::Network`]/[`FetchError::Timeout`] for transport failures.
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        if Url::parse(url).is_err() {
            return Err(FetchError::invalid_url(url));
        }
        self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })
    }

    /// Fetches a page and returns its body as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::HttpStatus`] for non-success responses in
    /// addition to the transport errors of [`Self::get`].
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        debug!(bytes = body.len(), "fetched page body");
        Ok(body)
    }

    /// Read access to the User-Agent this client identifies as.
    #[must_use]
    pub fn user_agent() -> String {
        default_user_agent()
    }
}
