//! Fetcher configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::score::ScoreConfig;

/// Default number of relays raced in the parallel stage.
pub const DEFAULT_FAN_OUT: usize = 10;

/// Default bound on each individual network attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(12);

/// Delay policy between sequential relay attempts.
///
/// The delay before the `n`-th retry is `base * growth^n`, hard-capped at
/// `cap`. The multiplicative shape is preserved from the original tuning;
/// the exact constants are configuration, not sacred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first retry (e.g. "300ms").
    #[serde(with = "humantime_serde")]
    pub base: Duration,
    /// Multiplicative growth factor per retry.
    pub growth: f64,
    /// Hard ceiling on any single delay (e.g. "2s").
    #[serde(with = "humantime_serde")]
    pub cap: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(300),
            growth: 1.5,
            cap: Duration::from_millis(2000),
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let ms = self.base.as_millis() as f64 * self.growth.powi(attempt as i32);
        let capped = ms.min(self.cap.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Configuration for a [`RelayFetcher`](crate::RelayFetcher).
///
/// Deserializable with humantime durations:
///
/// ```
/// let config: relaybox::FetcherConfig = serde_json::from_str(
///     r#"{
///         "relays": ["https://relay.example/?u={target}"],
///         "fan_out": 4,
///         "attempt_timeout": "10s",
///         "backoff": {"base": "250ms", "growth": 1.5, "cap": "2s"}
///     }"#,
/// ).unwrap();
/// assert_eq!(config.fan_out, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Relay URL templates, in configuration order.
    pub relays: Vec<String>,
    /// How many relays the parallel stage races (capped at the relay
    /// count).
    pub fan_out: usize,
    /// Bound on each individual network attempt; exceeding it counts as an
    /// ordinary failure.
    #[serde(with = "humantime_serde")]
    pub attempt_timeout: Duration,
    /// Delay policy for the sequential stage.
    pub backoff: BackoffConfig,
    /// Relay scoring policy.
    pub score: ScoreConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            relays: Vec::new(),
            fan_out: DEFAULT_FAN_OUT,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            backoff: BackoffConfig::default(),
            score: ScoreConfig::default(),
        }
    }
}

impl FetcherConfig {
    /// Configuration with the given relay templates and default knobs.
    pub fn with_relays<I, S>(relays: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            relays: relays.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
