//! Error taxonomy for fetch operations.
//!
//! Three failure classes are recovered locally — logged, scored against the
//! relay that produced them, and followed by the next attempt:
//!
//! - network failure or timeout ([`AttemptError::Network`])
//! - non-2xx status ([`AttemptError::Upstream`])
//! - malformed response body ([`AttemptError::Parse`])
//!
//! Only total exhaustion ([`FetchError::Exhausted`]) propagates to the
//! caller, as the single "content unavailable, retry later" signal.

use http::StatusCode;
use thiserror::Error;

use crate::transport::TransportError;

/// Failure of a single direct or relayed attempt.
///
/// Never surfaced to callers; consumed by the fetcher to score the attempt
/// and advance its state machine.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Connection failure or per-attempt timeout.
    #[error(transparent)]
    Network(#[from] TransportError),

    /// The upstream (or relay) answered with a non-2xx status.
    #[error("upstream returned {status}")]
    Upstream {
        /// The non-2xx status received.
        status: StatusCode,
    },

    /// The response body did not decode as the expected shape.
    #[error("response body failed to parse: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AttemptError {
    /// HTTP status associated with this failure, when a response arrived.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status } => Some(*status),
            Self::Network(_) | Self::Parse(_) => None,
        }
    }
}

/// Error surfaced by a fetch operation.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every stage — direct, parallel race, sequential sweep — failed.
    #[error("all fetch paths exhausted after {attempts} attempts")]
    Exhausted {
        /// Number of attempt outcomes observed before giving up.
        attempts: usize,
        /// The failure of the final attempt, for diagnostics.
        #[source]
        last: Option<AttemptError>,
    },
}
