//! Periodic expired-entry collection.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::BoundedCache;

impl<T: Clone + Send + 'static> BoundedCache<T> {
    /// Spawns a background task that runs
    /// [`cleanup_expired`](Self::cleanup_expired) every `period`.
    ///
    /// The task holds its own cache handle and runs until aborted via the
    /// returned handle or until the runtime shuts down. Missed ticks are
    /// skipped rather than bursted.
    pub fn spawn_cleanup(&self, period: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = cache.cleanup_expired();
                if removed > 0 {
                    tracing::debug!(removed, "periodic cleanup removed expired entries");
                }
            }
        })
    }
}
