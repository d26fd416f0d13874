//! Transfer client: HEAD probing and ranged GET requests.
//!
//! The orchestrator talks to the network only through the [`TransferClient`]
//! trait. [`HttpClient`] is the production implementation on top of a pooled
//! `reqwest::Client`; tests substitute in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, HeaderMap, RANGE};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::DownloadError;
use super::plan::ByteRange;
use crate::user_agent;

/// Response body as a stream of chunks. Dropping it closes the connection.
pub type ByteStream = BoxStream<'static, Result<Bytes, DownloadError>>;

/// What a HEAD request tells us about the resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadInfo {
    /// Advertised `Content-Length`; 0 when absent or unparseable.
    pub content_length: u64,
    /// Whether the server advertised `Accept-Ranges: bytes`.
    pub accepts_ranges: bool,
}

/// Network side of a download.
///
/// This trait uses `async_trait` so the orchestrator can hold it as
/// `Arc<dyn TransferClient>` and share it across spawned part tasks.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Issues a HEAD request to learn the content length.
    ///
    /// A non-2xx status is not an error; it yields a zero content length.
    async fn head(&self, url: &str) -> Result<HeadInfo, DownloadError>;

    /// Issues a GET with `Range: <range>` and returns the body stream.
    async fn get_range(&self, url: &str, range: ByteRange) -> Result<ByteStream, DownloadError>;
}

/// HTTP client for ranged downloads.
///
/// Create it once and share it: the inner `reqwest::Client` pools connections,
/// so every part task of a concurrent download reuses them.
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
    /// Creates a client with the default connect timeout (30 seconds).
    ///
    /// No whole-request timeout is set: a part transfer runs until the
    /// transport completes or fails.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_connect_timeout(CONNECT_TIMEOUT_SECS)
    }

    /// Creates a client with an explicit connect timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build (for example when no
    /// TLS backend can be initialized).
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_connect_timeout(connect_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .user_agent(user_agent::default_download_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl TransferClient for HttpClient {
    #[instrument(level = "debug", skip_all, fields(url = %url))]
    async fn head(&self, url: &str) -> Result<HeadInfo, DownloadError> {
        let parsed = parse_url(url)?;
        let response = self
            .client
            .head(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                "HEAD returned non-success status; treating content length as 0"
            );
            return Ok(HeadInfo::default());
        }

        let info = HeadInfo {
            content_length: header_u64(response.headers(), CONTENT_LENGTH).unwrap_or(0),
            accepts_ranges: response
                .headers()
                .get(ACCEPT_RANGES)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.eq_ignore_ascii_case("bytes")),
        };
        debug!(
            content_length = info.content_length,
            accepts_ranges = info.accepts_ranges,
            "HEAD complete"
        );
        Ok(info)
    }

    #[instrument(level = "debug", skip_all, fields(url = %url, range = %range))]
    async fn get_range(&self, url: &str, range: ByteRange) -> Result<ByteStream, DownloadError> {
        let parsed = parse_url(url)?;
        let range_value = range.header_value();
        let response = self
            .client
            .get(parsed)
            .header(RANGE, range_value.as_str())
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if status == StatusCode::RANGE_NOT_SATISFIABLE && range.is_open() {
            debug!("nothing left to fetch past the requested offset");
            return Ok(stream::empty::<Result<Bytes, DownloadError>>().boxed());
        }
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        if status == StatusCode::OK && !full_body_matches(range, response.headers()) {
            return Err(DownloadError::range_ignored(url, range_value));
        }

        let url = url.to_string();
        Ok(response
            .bytes_stream()
            .map_err(move |e| DownloadError::network(url.clone(), e))
            .boxed())
    }
}

fn parse_url(url: &str) -> Result<Url, DownloadError> {
    Url::parse(url).map_err(|e| DownloadError::invalid_input(format!("invalid url {url}: {e}")))
}

fn header_u64(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// A `200 OK` carries the whole resource. That is only usable when the range
/// starts at 0 and, if bounded, the body is no longer than the range.
fn full_body_matches(range: ByteRange, headers: &HeaderMap) -> bool {
    if range.start() != 0 {
        return false;
    }
    match (range.len(), header_u64(headers, CONTENT_LENGTH)) {
        (Some(expected), Some(actual)) => actual <= expected,
        _ => true,
    }
}
