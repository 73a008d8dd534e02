//! The staged relay fetcher.
//!
//! A logical fetch walks a fixed state machine, terminating early at any
//! stage on the first 2xx response:
//!
//! 1. **Direct** — one attempt on the raw target URL.
//! 2. **Parallel race** — the top-N relays by score are attempted
//!    concurrently; the first success wins. Losing attempts are not
//!    aborted: they run to completion in the background so their outcomes
//!    still reach the score tracker, but their results are discarded.
//! 3. **Sequential sweep** — every configured relay in ranked order, one at
//!    a time, with capped exponential backoff between attempts.
//! 4. **Exhausted** — surfaced as the single caller-visible error.
//!
//! Every attempt, whichever stage issued it, is bounded by the per-attempt
//! timeout and recorded with its measured latency.

use std::sync::Arc;
use std::time::Instant;

use relaybox_core::{AttemptOutcome, Raw, RelayEndpoint, RelayId};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::config::FetcherConfig;
use crate::error::{AttemptError, FetchError};
use crate::score::ScoreTracker;
use crate::transport::{Transport, TransportResponse};

/// Fetches a resource despite an unreliable direct path, using scored
/// relay endpoints as fallback.
///
/// The fetcher is cheap to clone; clones share the transport, the endpoint
/// list, and the score tracker, so scoring learned by one clone benefits
/// all of them.
///
/// # Example
///
/// ```no_run
/// # async fn example(transport: std::sync::Arc<dyn relaybox::Transport>) {
/// use relaybox::{FetcherConfig, RelayFetcher};
///
/// let config = FetcherConfig::with_relays([
///     "https://relay-a.example/?u={target}",
///     "https://relay-b.example/fetch/{target}",
/// ]);
/// let fetcher = RelayFetcher::new(config, transport);
/// let body = fetcher.fetch("https://api.example/search?q=matrix").await;
/// # let _ = body;
/// # }
/// ```
#[derive(Clone)]
pub struct RelayFetcher {
    transport: Arc<dyn Transport>,
    relays: Arc<Vec<RelayEndpoint>>,
    tracker: ScoreTracker,
    config: Arc<FetcherConfig>,
}

impl std::fmt::Debug for RelayFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayFetcher")
            .field("relays", &self.relays.len())
            .field("config", &self.config)
            .finish()
    }
}

impl RelayFetcher {
    /// Creates a fetcher from configuration and a transport.
    pub fn new(config: FetcherConfig, transport: Arc<dyn Transport>) -> Self {
        let relays: Vec<RelayEndpoint> =
            config.relays.iter().map(RelayEndpoint::new).collect();
        let tracker = ScoreTracker::new(config.score.clone());
        Self {
            transport,
            relays: Arc::new(relays),
            tracker,
            config: Arc::new(config),
        }
    }

    /// The shared score tracker.
    pub fn tracker(&self) -> &ScoreTracker {
        &self.tracker
    }

    /// The configured relay endpoints, in configuration order.
    pub fn relays(&self) -> &[RelayEndpoint] {
        &self.relays
    }

    /// Fetches the raw response body for `url`.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> Result<Raw, FetchError> {
        self.run(url, |response| Ok(response.body)).await
    }

    /// Fetches `url` and decodes the body as JSON.
    ///
    /// A body that fails to decode counts as that attempt's failure and
    /// advances the state machine, exactly like a network error would.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn fetch_json<T>(&self, url: &str) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.run(url, |response| {
            serde_json::from_slice(&response.body).map_err(AttemptError::from)
        })
        .await
    }

    /// Walks the stages with the given response decoder.
    async fn run<T, F>(&self, url: &str, decode: F) -> Result<T, FetchError>
    where
        T: Send + 'static,
        F: Fn(TransportResponse) -> Result<T, AttemptError> + Send + Sync + Clone + 'static,
    {
        let mut attempts = 0usize;
        let mut last = None;

        // Stage 1: direct attempt, no relay.
        attempts += 1;
        match self.attempt(RelayId::Direct, url.to_owned(), decode.clone()).await {
            Ok(value) => {
                #[cfg(feature = "metrics")]
                metrics::counter!(*crate::metrics::FETCH_SUCCESS_COUNTER).increment(1);
                return Ok(value);
            }
            Err(err) => {
                tracing::debug!(error = %err, "direct attempt failed, falling back to relays");
                last = Some(err);
            }
        }

        let ranked = self.tracker.rank(self.relays.len());

        // Stage 2: race the top-N relays; first 2xx wins.
        let fan_out = self.config.fan_out.min(ranked.len());
        if fan_out > 0 {
            let (tx, mut rx) = mpsc::channel(fan_out);
            for &index in &ranked[..fan_out] {
                let this = self.clone();
                let url = url.to_owned();
                let decode = decode.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let relayed = this.relays[index].build_url(&url);
                    let result = this
                        .attempt(RelayId::Relay(index), relayed, decode)
                        .await;
                    // The receiver is gone once a sibling has won; the
                    // outcome was already scored inside attempt().
                    let _ = tx.send(result).await;
                });
            }
            drop(tx);

            while let Some(result) = rx.recv().await {
                attempts += 1;
                match result {
                    Ok(value) => {
                        tracing::debug!("parallel relay race won");
                        #[cfg(feature = "metrics")]
                        metrics::counter!(*crate::metrics::FETCH_SUCCESS_COUNTER).increment(1);
                        return Ok(value);
                    }
                    Err(err) => last = Some(err),
                }
            }
            tracing::debug!(fan_out, "parallel relay race exhausted");
        }

        // Stage 3: every relay in ranked order, one at a time, with capped
        // exponential backoff between attempts.
        for (position, &index) in ranked.iter().enumerate() {
            if position > 0 {
                let delay = self.config.backoff.delay((position - 1) as u32);
                tokio::time::sleep(delay).await;
            }
            attempts += 1;
            let relayed = self.relays[index].build_url(url);
            match self
                .attempt(RelayId::Relay(index), relayed, decode.clone())
                .await
            {
                Ok(value) => {
                    #[cfg(feature = "metrics")]
                    metrics::counter!(*crate::metrics::FETCH_SUCCESS_COUNTER).increment(1);
                    return Ok(value);
                }
                Err(err) => last = Some(err),
            }
        }

        tracing::warn!(attempts, "all fetch paths exhausted");
        #[cfg(feature = "metrics")]
        metrics::counter!(*crate::metrics::FETCH_EXHAUSTED_COUNTER).increment(1);
        Err(FetchError::Exhausted { attempts, last })
    }

    /// One bounded attempt over a single path; records the outcome
    /// whatever happens.
    async fn attempt<T, F>(&self, id: RelayId, url: String, decode: F) -> Result<T, AttemptError>
    where
        F: Fn(TransportResponse) -> Result<T, AttemptError>,
    {
        #[cfg(feature = "metrics")]
        metrics::counter!(*crate::metrics::ATTEMPT_COUNTER).increment(1);

        let started = Instant::now();
        let result = tokio::time::timeout(self.config.attempt_timeout, self.transport.fetch(&url))
            .await;
        let latency = started.elapsed();

        let mut observed_status = None;
        let outcome = match result {
            Err(_elapsed) => Err(AttemptError::Network(
                crate::transport::TransportError::Timeout(self.config.attempt_timeout),
            )),
            Ok(Err(err)) => Err(AttemptError::Network(err)),
            Ok(Ok(response)) => {
                let status = response.status;
                observed_status = Some(status);
                if response.is_success() {
                    decode(response).map_err(|err| {
                        // A 2xx that fails to decode still penalizes the path.
                        tracing::debug!(%id, %status, "response body rejected by decoder");
                        err
                    })
                } else {
                    Err(AttemptError::Upstream { status })
                }
            }
        };

        match &outcome {
            Ok(_) => {
                // A successful attempt always observed a 2xx status.
                let status = observed_status.unwrap_or(http::StatusCode::OK);
                self.tracker
                    .record(&AttemptOutcome::success(id, latency, status));
                tracing::trace!(%id, latency_ms = latency.as_millis() as u64, "attempt succeeded");
            }
            Err(err) => {
                self.tracker
                    .record(&AttemptOutcome::failure(id, latency, observed_status));
                tracing::debug!(%id, error = %err, "attempt failed");
            }
        }

        outcome
    }
}
