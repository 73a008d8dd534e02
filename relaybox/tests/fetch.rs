//! Staged fetch behavior against scripted transports.

mod common;

use std::sync::Arc;
use std::time::Duration;

use relaybox::{BackoffConfig, FetchError, FetcherConfig, RelayFetcher, RelayId};

use common::{Script, ScriptedTransport};

const TARGET: &str = "https://api.test/search?q=matrix";

/// Three relays with fast test backoff.
fn test_config(fan_out: usize) -> FetcherConfig {
    FetcherConfig {
        relays: vec![
            "https://r0.test/?u={target}".into(),
            "https://r1.test/?u={target}".into(),
            "https://r2.test/?u={target}".into(),
        ],
        fan_out,
        attempt_timeout: Duration::from_millis(500),
        backoff: BackoffConfig {
            base: Duration::from_millis(1),
            growth: 1.5,
            cap: Duration::from_millis(5),
        },
        ..FetcherConfig::default()
    }
}

#[tokio::test]
async fn direct_success_short_circuits() {
    let transport = Arc::new(
        ScriptedTransport::new().on("api.test", Script::Respond(200, "payload")),
    );
    let fetcher = RelayFetcher::new(test_config(3), transport.clone());

    let body = fetcher.fetch(TARGET).await.unwrap();
    assert_eq!(&body[..], &b"payload"[..]);

    assert_eq!(transport.total_calls(), 1, "no relay should be contacted");
    assert_eq!(fetcher.tracker().snapshot(RelayId::Direct).successes, 1);
    for index in 0..3 {
        assert_eq!(fetcher.tracker().snapshot(RelayId::Relay(index)).attempts(), 0);
    }
}

#[tokio::test]
async fn healthy_relay_wins_among_failing_siblings() {
    // Relay #1 is the only healthy path; direct, #0 and #2 all fail.
    let transport = Arc::new(
        ScriptedTransport::new()
            .on("api.test", Script::Respond(500, "err"))
            .on("r0.test", Script::Network)
            .on("r1.test", Script::Respond(200, "relayed"))
            .on("r2.test", Script::Respond(502, "bad gateway")),
    );
    let fetcher = RelayFetcher::new(test_config(3), transport);

    let body = fetcher.fetch(TARGET).await.unwrap();
    assert_eq!(&body[..], &b"relayed"[..]);

    let stats = fetcher.tracker().snapshot(RelayId::Relay(1));
    assert_eq!(stats.successes, 1, "exactly one success against relay #1");
    assert_eq!(stats.failures, 0);
}

#[tokio::test]
async fn sequential_sweep_reaches_relays_beyond_the_fan_out() {
    // Fan-out 1 races only the top-ranked relay (#0, which fails); the
    // sequential sweep must still reach the healthy relay #1.
    let transport = Arc::new(
        ScriptedTransport::new()
            .on("api.test", Script::Network)
            .on("r0.test", Script::Network)
            .on("r1.test", Script::Respond(200, "eventually"))
            .on("r2.test", Script::Network),
    );
    let fetcher = RelayFetcher::new(test_config(1), transport.clone());

    let body = fetcher.fetch(TARGET).await.unwrap();
    assert_eq!(&body[..], &b"eventually"[..]);

    assert_eq!(fetcher.tracker().snapshot(RelayId::Relay(1)).successes, 1);
    assert_eq!(transport.calls_matching("r1.test"), 1);
    // Relay #2 is ranked after #1 and never needed.
    assert_eq!(transport.calls_matching("r2.test"), 0);
}

#[tokio::test]
async fn exhaustion_surfaces_as_single_error() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .on("api.test", Script::Respond(503, "down"))
            .on("r0.test", Script::Network)
            .on("r1.test", Script::Respond(500, "down"))
            .on("r2.test", Script::Network),
    );
    let fetcher = RelayFetcher::new(test_config(3), transport);

    let err = fetcher.fetch(TARGET).await.unwrap_err();
    // Direct + three racers + three sequential attempts.
    match err {
        FetchError::Exhausted { attempts, .. } => assert_eq!(attempts, 7),
    }

    for index in 0..3 {
        let stats = fetcher.tracker().snapshot(RelayId::Relay(index));
        assert_eq!(stats.successes, 0, "no success should be recorded anywhere");
        assert!(stats.failures >= 1);
    }
}

#[tokio::test]
async fn empty_relay_list_fails_after_direct_attempt() {
    let transport = Arc::new(ScriptedTransport::new().on("api.test", Script::Network));
    let config = FetcherConfig {
        attempt_timeout: Duration::from_millis(500),
        ..FetcherConfig::default()
    };
    let fetcher = RelayFetcher::new(config, transport);

    let err = fetcher.fetch(TARGET).await.unwrap_err();
    match err {
        FetchError::Exhausted { attempts, .. } => assert_eq!(attempts, 1),
    }
}

#[derive(Debug, serde::Deserialize)]
struct SearchHit {
    title: String,
    year: u32,
}

#[tokio::test]
async fn parse_failure_advances_to_the_next_path() {
    // The direct path answers 200 with garbage; the decode failure must be
    // treated like any other failure and fall through to the relays.
    let transport = Arc::new(
        ScriptedTransport::new()
            .on("api.test", Script::Respond(200, "<html>not json</html>"))
            .on("r0.test", Script::Respond(200, r#"{"title":"Heat","year":1995}"#)),
    );
    let fetcher = RelayFetcher::new(test_config(3), transport);

    let hit: SearchHit = fetcher.fetch_json(TARGET).await.unwrap();
    assert_eq!(hit.title, "Heat");
    assert_eq!(hit.year, 1995);

    let direct = fetcher.tracker().snapshot(RelayId::Direct);
    assert_eq!(direct.successes, 0);
    assert_eq!(direct.failures, 1, "a 2xx with a bad body penalizes the path");
}

#[tokio::test]
async fn timeout_counts_as_an_ordinary_failure() {
    struct StalledTransport;

    #[async_trait::async_trait]
    impl relaybox::Transport for StalledTransport {
        async fn fetch(
            &self,
            url: &str,
        ) -> Result<relaybox::TransportResponse, relaybox::TransportError> {
            if url.contains("r0.test") {
                return Ok(relaybox::TransportResponse::new(
                    http::StatusCode::OK,
                    &b"rescued"[..],
                ));
            }
            // Never responds within the attempt timeout.
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("sleep outlives every test timeout")
        }
    }

    let mut config = test_config(3);
    config.attempt_timeout = Duration::from_millis(50);
    let fetcher = RelayFetcher::new(config, Arc::new(StalledTransport));

    let body = fetcher.fetch(TARGET).await.unwrap();
    assert_eq!(&body[..], &b"rescued"[..]);
    assert_eq!(fetcher.tracker().snapshot(RelayId::Direct).failures, 1);
}
