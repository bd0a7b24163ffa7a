//! HTTP response wrapper.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::error::Error;

/// The outcome of a dispatched request: the transport response plus the
/// resolved URL that was actually sent and the measured round-trip time.
#[derive(Debug)]
pub struct Response {
    url: String,
    elapsed: Duration,
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(url: String, elapsed: Duration, inner: reqwest::Response) -> Self {
        Self {
            url,
            elapsed,
            inner,
        }
    }

    /// The fully resolved URL, after query merging.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wall-clock duration of the whole exchange, connection setup included.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in whole milliseconds.
    pub fn elapsed_millis(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Response status code.
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Content length, when the server declared one.
    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length()
    }

    /// Read the full body as text.
    pub async fn text(self) -> Result<String, Error> {
        self.inner.text().await.map_err(Error::Transport)
    }

    /// Read the full body as bytes.
    pub async fn bytes(self) -> Result<bytes::Bytes, Error> {
        self.inner.bytes().await.map_err(Error::Transport)
    }

    /// Unwrap the underlying transport response.
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}
