//! HTTP fetcher implementation
//!
//! The crawl engine talks to the network only through the [`Fetcher`] trait.
//! [`HttpFetcher`] is the reqwest-backed implementation; tests substitute
//! scripted fetchers.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Headers sent with a single request
pub type RequestHeaders = BTreeMap<String, String>;

/// A fetched page, whatever its status
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL that served the response
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// `Location` header of a redirect response
    pub location: Option<String>,
    /// Page body content
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// True for a 3xx response that names its target
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code) && self.location.is_some()
    }
}

/// Transport-level failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

/// Issues GET requests on behalf of the crawl engine
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL with the given headers
    ///
    /// Non-2xx statuses are returned as responses; only transport failures
    /// are errors.
    async fn fetch(&self, url: &Url, headers: &RequestHeaders)
        -> Result<FetchResponse, FetchError>;
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with the given request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(timeout)?))
    }
}

/// Builds an HTTP client with proper configuration
///
/// No default User-Agent is set: every request carries a rotated identity
/// header supplied by the engine.
///
/// Redirects are not followed. A redirect target goes back through the
/// classifier and the frontier like any other discovered URL.
///
/// # Example
///
/// ```no_run
/// use headline_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_secs(20)).unwrap();
/// ```
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(reqwest::redirect::Policy::none()) // Handle redirects in the engine
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &Url,
        headers: &RequestHeaders,
    ) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .headers(to_header_map(headers))
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchResponse {
            final_url,
            status_code,
            location,
            body,
        })
    }
}

fn to_header_map(headers: &RequestHeaders) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::debug!("Dropping invalid header {}", name),
        }
    }
    map
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
