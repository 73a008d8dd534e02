//! Per-relay rolling statistics and ranking.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use relaybox_core::{AttemptOutcome, RelayId};
use serde::{Deserialize, Serialize};

/// Scoring policy knobs.
///
/// The 70/30 success/latency weighting and the 5 s latency normalizer are
/// policy choices carried over from the original tuning, not derived
/// quantities; treat them as configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Weight of the success rate in the blended score.
    pub success_weight: f64,
    /// Weight of the latency component in the blended score.
    pub latency_weight: f64,
    /// Average latency at or beyond which the latency component scores 0.
    #[serde(with = "humantime_serde")]
    pub latency_ceiling: Duration,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            success_weight: 0.7,
            latency_weight: 0.3,
            latency_ceiling: Duration::from_secs(5),
        }
    }
}

/// Rolling statistics for one path (direct or a configured relay).
///
/// Counters only ever grow during a session; endpoints are never removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Attempts that produced a usable 2xx response.
    pub successes: u64,
    /// Attempts that failed for any reason.
    pub failures: u64,
    /// Sum of attempt latencies, in milliseconds.
    pub cumulative_latency_ms: u64,
}

impl RelayStats {
    /// Total recorded attempts.
    pub fn attempts(&self) -> u64 {
        self.successes + self.failures
    }

    /// Mean latency across all attempts, or `None` before the first one.
    pub fn avg_latency_ms(&self) -> Option<f64> {
        match self.attempts() {
            0 => None,
            n => Some(self.cumulative_latency_ms as f64 / n as f64),
        }
    }
}

/// Tracks per-path statistics and ranks relays by a blended score.
///
/// The handle is cheap to clone and all clones share state. Every mutation
/// goes through [`record`](Self::record) — the single synchronized path
/// that keeps the counters coherent on a multi-threaded runtime, where the
/// original single-threaded-event-loop guarantee no longer holds.
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    stats: Arc<DashMap<RelayId, RelayStats>>,
    config: ScoreConfig,
}

impl ScoreTracker {
    /// Creates a tracker with the given scoring policy.
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            stats: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Folds one attempt outcome into the path's counters.
    pub fn record(&self, outcome: &AttemptOutcome) {
        let mut stats = self.stats.entry(outcome.id).or_default();
        if outcome.success {
            stats.successes += 1;
        } else {
            stats.failures += 1;
        }
        stats.cumulative_latency_ms += outcome.latency.as_millis() as u64;
        tracing::trace!(
            id = %outcome.id,
            success = outcome.success,
            latency_ms = outcome.latency.as_millis() as u64,
            "attempt recorded",
        );
    }

    /// Blended score in `[0, 1]` for a path.
    ///
    /// A path with zero recorded attempts scores a neutral `0.5`, so
    /// untested relays get a fair chance against proven ones. Otherwise the
    /// score is `success_weight * success_rate + latency_weight *
    /// latency_score`, where the latency component decays linearly from 1
    /// at zero average latency to 0 at the configured ceiling.
    pub fn score(&self, id: RelayId) -> f64 {
        let stats = self.snapshot(id);
        let Some(avg_latency_ms) = stats.avg_latency_ms() else {
            return 0.5;
        };
        let success_rate = stats.successes as f64 / stats.attempts() as f64;
        let ceiling_ms = self.config.latency_ceiling.as_millis() as f64;
        let latency_score = (1.0 - avg_latency_ms / ceiling_ms).max(0.0);
        let blended =
            self.config.success_weight * success_rate + self.config.latency_weight * latency_score;
        blended.clamp(0.0, 1.0)
    }

    /// Relay indices `0..relay_count` sorted by descending score.
    ///
    /// The sort is stable: ties keep the original configuration order, so
    /// ranking is deterministic for testing.
    pub fn rank(&self, relay_count: usize) -> Vec<usize> {
        let scores: Vec<f64> = (0..relay_count)
            .map(|index| self.score(RelayId::Relay(index)))
            .collect();
        let mut indices: Vec<usize> = (0..relay_count).collect();
        indices.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
        indices
    }

    /// Copy of a path's current statistics.
    pub fn snapshot(&self, id: RelayId) -> RelayStats {
        self.stats.get(&id).map(|entry| *entry).unwrap_or_default()
    }

    /// The scoring policy in use.
    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }
}

impl Default for ScoreTracker {
    fn default() -> Self {
        Self::new(ScoreConfig::default())
    }
}
