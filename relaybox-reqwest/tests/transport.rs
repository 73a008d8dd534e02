//! End-to-end fetch behavior over real HTTP via wiremock.

use std::sync::Arc;
use std::time::Duration;

use relaybox::{BackoffConfig, FetchError, FetcherConfig, RelayFetcher};
use relaybox_reqwest::ReqwestTransport;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_with_relays(relays: Vec<String>) -> FetcherConfig {
    FetcherConfig {
        relays,
        attempt_timeout: Duration::from_secs(5),
        backoff: BackoffConfig {
            base: Duration::from_millis(1),
            growth: 1.5,
            cap: Duration::from_millis(5),
        },
        ..FetcherConfig::default()
    }
}

#[tokio::test]
async fn direct_success_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("direct"))
        .mount(&server)
        .await;

    let transport = Arc::new(ReqwestTransport::new().unwrap());
    let fetcher = RelayFetcher::new(config_with_relays(vec![]), transport);

    let body = fetcher.fetch(&format!("{}/api", server.uri())).await.unwrap();
    assert_eq!(&body[..], &b"direct"[..]);
}

#[tokio::test]
async fn blocked_direct_path_falls_back_to_relay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/relay"))
        .respond_with(ResponseTemplate::new(200).set_body_string("relayed"))
        .mount(&server)
        .await;

    let relay = format!("{}/relay?u={{target}}", server.uri());
    let transport = Arc::new(ReqwestTransport::new().unwrap());
    let fetcher = RelayFetcher::new(config_with_relays(vec![relay]), transport);

    let body = fetcher.fetch(&format!("{}/api", server.uri())).await.unwrap();
    assert_eq!(&body[..], &b"relayed"[..]);
}

#[tokio::test]
async fn relay_receives_the_encoded_target() {
    let server = MockServer::start().await;
    let target = format!("{}/api?q=heat", server.uri());

    Mock::given(method("GET"))
        .and(path("/relay"))
        .and(query_param("u", target.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let relay = format!("{}/relay?u={{target}}", server.uri());
    let transport = Arc::new(ReqwestTransport::new().unwrap());
    let fetcher = RelayFetcher::new(config_with_relays(vec![relay]), transport);

    // The direct path 404s (no mock for /api), forcing the relay.
    let body = fetcher.fetch(&target).await.unwrap();
    assert_eq!(&body[..], &b"ok"[..]);
}

#[tokio::test]
async fn unreachable_everything_exhausts() {
    // Port 9 is discard/unassigned; connections fail fast.
    let transport = Arc::new(ReqwestTransport::new().unwrap());
    let fetcher = RelayFetcher::new(
        config_with_relays(vec!["http://127.0.0.1:9/?u={target}".into()]),
        transport,
    );

    let err = fetcher.fetch("http://127.0.0.1:9/api").await.unwrap_err();
    assert!(matches!(err, FetchError::Exhausted { .. }));
}
