#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Cache-then-fetch composition.
///
/// [`CachedFetcher`](cached::CachedFetcher) consults the bounded client
/// cache before going to the network and inserts successful payloads back,
/// so identical lookups within the TTL window cost nothing.
pub mod cached;

/// Configuration for the fetching engine.
///
/// [`FetcherConfig`](config::FetcherConfig) carries the relay list, the
/// parallel fan-out, the per-attempt timeout, and the backoff and scoring
/// knobs, all deserializable with humantime durations.
pub mod config;

/// Error types for fetch operations.
///
/// Individual attempt failures ([`AttemptError`](error::AttemptError)) are
/// recovered internally; only relay exhaustion
/// ([`FetchError::Exhausted`](error::FetchError::Exhausted)) reaches the
/// caller.
pub mod error;

/// The staged relay fetcher.
///
/// [`RelayFetcher`](fetch::RelayFetcher) walks
/// direct → parallel race → sequential sweep, terminating early on the
/// first 2xx response.
pub mod fetch;

/// Metrics collection for fetch observability.
///
/// When the `metrics` feature is enabled, this module provides counters for
/// attempts, exhaustion events, and cache hits/misses.
pub mod metrics;

/// Per-relay rolling statistics and ranking.
///
/// [`ScoreTracker`](score::ScoreTracker) blends success rate and average
/// latency into a `[0, 1]` score that orders relay attempts.
pub mod score;

/// The transport seam between the fetcher and an HTTP client.
pub mod transport;

pub use cached::CachedFetcher;
pub use config::{BackoffConfig, FetcherConfig};
pub use error::{AttemptError, FetchError};
pub use fetch::RelayFetcher;
pub use score::{RelayStats, ScoreConfig, ScoreTracker};
pub use transport::{Transport, TransportError, TransportResponse};

pub use relaybox_core::{AttemptOutcome, CacheValue, LookupKey, Raw, RelayEndpoint, RelayId};
