//! Relay endpoint configuration and attempt outcomes.
//!
//! A [`RelayEndpoint`] is a URL template for a third-party relay that
//! forwards an arbitrary target URL. Endpoints are created once at startup
//! from configuration and never removed during a session; their rolling
//! statistics live in the fetching engine's score tracker, keyed by
//! [`RelayId`].

use std::fmt;
use std::time::Duration;

use http::StatusCode;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Placeholder substituted with the percent-encoded target URL.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// A configured relay endpoint.
///
/// The template either contains [`TARGET_PLACEHOLDER`], which is replaced
/// with the percent-encoded target URL, or the encoded target is appended:
///
/// ```
/// use relaybox_core::RelayEndpoint;
///
/// let relay = RelayEndpoint::new("https://relay.example/fetch?url={target}");
/// assert_eq!(
///     relay.build_url("https://api.example/a?b=1"),
///     "https://relay.example/fetch?url=https%3A%2F%2Fapi%2Eexample%2Fa%3Fb%3D1",
/// );
///
/// let suffix = RelayEndpoint::new("https://relay.example/");
/// assert!(suffix.build_url("https://api.example/").starts_with("https://relay.example/https%3A"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    template: String,
}

impl RelayEndpoint {
    /// Creates an endpoint from its URL template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Returns the raw URL template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Builds the relayed URL for a target.
    ///
    /// The target is percent-encoded so the relay receives it as a single
    /// query value regardless of its own query string.
    pub fn build_url(&self, target: &str) -> String {
        let encoded = utf8_percent_encode(target, NON_ALPHANUMERIC).to_string();
        if self.template.contains(TARGET_PLACEHOLDER) {
            self.template.replace(TARGET_PLACEHOLDER, &encoded)
        } else {
            format!("{}{}", self.template, encoded)
        }
    }
}

/// Identifies which network path a fetch attempt used.
///
/// `Relay(i)` indexes the configured endpoint list in its original order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayId {
    /// The un-relayed direct path.
    Direct,
    /// A configured relay, by position in the endpoint list.
    Relay(usize),
}

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Relay(index) => write!(f, "relay-{index}"),
        }
    }
}

/// Transient record of a single fetch attempt.
///
/// Consumed by the score tracker to update the rolling statistics of the
/// path identified by `id`; never persisted.
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    /// Which path performed the attempt.
    pub id: RelayId,
    /// Whether the attempt produced a usable response.
    pub success: bool,
    /// Time from request start to response or failure.
    pub latency: Duration,
    /// HTTP status, when a response arrived at all.
    pub status: Option<StatusCode>,
}

impl AttemptOutcome {
    /// Records a successful attempt.
    pub fn success(id: RelayId, latency: Duration, status: StatusCode) -> Self {
        Self {
            id,
            success: true,
            latency,
            status: Some(status),
        }
    }

    /// Records a failed attempt; `status` is present for non-2xx responses
    /// and decode failures, absent for network errors and timeouts.
    pub fn failure(id: RelayId, latency: Duration, status: Option<StatusCode>) -> Self {
        Self {
            id,
            success: false,
            latency,
            status,
        }
    }
}
