//! Cache-then-fetch composition.

use bytes::Bytes;
use relaybox_cache::BoundedCache;
use relaybox_core::LookupKey;

use crate::error::FetchError;
use crate::fetch::RelayFetcher;

/// A [`RelayFetcher`] fronted by a bounded TTL/LRU cache.
///
/// Lookups go to the cache first; a miss (or any cache-layer problem,
/// which the cache recovers from internally) falls through to a live
/// staged fetch, and successful payloads are inserted for the next caller.
/// The only error that ever reaches the caller is
/// [`FetchError::Exhausted`].
///
/// # Example
///
/// ```no_run
/// # async fn example(fetcher: relaybox::RelayFetcher) -> Result<(), relaybox::FetchError> {
/// use std::time::Duration;
/// use relaybox::{CachedFetcher, LookupKey};
/// use relaybox_cache::BoundedCache;
///
/// let cache = BoundedCache::new(100, Duration::from_secs(2 * 60 * 60));
/// let cached = CachedFetcher::new(fetcher, cache);
///
/// let key = LookupKey::new("search", "The Matrix");
/// let body = cached
///     .get_or_fetch(&key, "https://api.example/search?q=The+Matrix")
///     .await?;
/// # let _ = body;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    fetcher: RelayFetcher,
    cache: BoundedCache<Bytes>,
}

impl CachedFetcher {
    /// Pairs a fetcher with a cache.
    pub fn new(fetcher: RelayFetcher, cache: BoundedCache<Bytes>) -> Self {
        Self { fetcher, cache }
    }

    /// Returns the cached payload for `key`, or fetches `url` and caches
    /// the result.
    #[tracing::instrument(skip(self, key), level = "debug", fields(key = %key))]
    pub async fn get_or_fetch(&self, key: &LookupKey, url: &str) -> Result<Bytes, FetchError> {
        if let Some(entry) = self.cache.get(key) {
            tracing::trace!(%key, "cache hit");
            #[cfg(feature = "metrics")]
            metrics::counter!(*crate::metrics::CACHE_HIT_COUNTER).increment(1);
            return Ok(entry.into_inner());
        }
        tracing::trace!(%key, "cache miss");
        #[cfg(feature = "metrics")]
        metrics::counter!(*crate::metrics::CACHE_MISS_COUNTER).increment(1);

        let body = self.fetcher.fetch(url).await?;
        self.cache.insert(key.clone(), body.clone());
        Ok(body)
    }

    /// The underlying fetcher.
    pub fn fetcher(&self) -> &RelayFetcher {
        &self.fetcher
    }

    /// The underlying cache.
    pub fn cache(&self) -> &BoundedCache<Bytes> {
        &self.cache
    }
}
