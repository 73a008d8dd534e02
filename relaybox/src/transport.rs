//! Transport seam.
//!
//! The fetcher never talks to a concrete HTTP client; it calls a
//! [`Transport`] injected as `Arc<dyn Transport>`. `relaybox-reqwest`
//! provides the production implementation, and tests drive the fetcher
//! with scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use relaybox_core::Raw;
use thiserror::Error;

/// A buffered upstream response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Complete response body.
    pub body: Raw,
}

impl TransportResponse {
    /// Creates a response from its parts.
    pub fn new(status: StatusCode, body: impl Into<Raw>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Error type for a single transport call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection-level failure (refused, reset, DNS, TLS).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The attempt exceeded its deadline.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Performs one HTTP GET against a URL, buffering the full body.
///
/// Implementations should not retry or follow relay templates; staging,
/// timeouts, and scoring are the fetcher's job.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, resolving to the buffered response or a transport
    /// error.
    async fn fetch(&self, url: &str) -> Result<TransportResponse, TransportError>;
}
