//! Cache-then-fetch composition behavior.

mod common;

use std::sync::Arc;
use std::time::Duration;

use relaybox::{CachedFetcher, FetchError, FetcherConfig, LookupKey, RelayFetcher};
use relaybox_cache::BoundedCache;

use common::{Script, ScriptedTransport};

const TARGET: &str = "https://api.test/search?q=matrix";

fn cached(transport: Arc<ScriptedTransport>) -> CachedFetcher {
    let config = FetcherConfig {
        attempt_timeout: Duration::from_millis(500),
        ..FetcherConfig::default()
    };
    let fetcher = RelayFetcher::new(config, transport);
    CachedFetcher::new(fetcher, BoundedCache::new(10, Duration::from_secs(60)))
}

#[tokio::test]
async fn second_lookup_is_served_from_cache() {
    let transport = Arc::new(
        ScriptedTransport::new().on("api.test", Script::Respond(200, "payload")),
    );
    let client = cached(transport.clone());
    let key = LookupKey::new("search", "The Matrix");

    let first = client.get_or_fetch(&key, TARGET).await.unwrap();
    let second = client.get_or_fetch(&key, TARGET).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.total_calls(), 1, "second lookup must not hit the network");
}

#[tokio::test]
async fn colliding_raw_inputs_share_one_entry() {
    let transport = Arc::new(
        ScriptedTransport::new().on("api.test", Script::Respond(200, "payload")),
    );
    let client = cached(transport.clone());

    // Distinct raw titles, identical normalized key: documented collision
    // behavior.
    client
        .get_or_fetch(&LookupKey::new("search", "Heat!"), TARGET)
        .await
        .unwrap();
    client
        .get_or_fetch(&LookupKey::new("search", "(heat)"), TARGET)
        .await
        .unwrap();

    assert_eq!(transport.total_calls(), 1);
    assert_eq!(client.cache().len(), 1);
}

#[tokio::test]
async fn exhaustion_passes_through_and_caches_nothing() {
    let transport = Arc::new(ScriptedTransport::new().on("api.test", Script::Network));
    let client = cached(transport);
    let key = LookupKey::new("search", "Nowhere");

    let err = client.get_or_fetch(&key, TARGET).await.unwrap_err();
    assert!(matches!(err, FetchError::Exhausted { .. }));
    assert!(client.cache().is_empty());
}
