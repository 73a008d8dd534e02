//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use relaybox::{Transport, TransportError, TransportResponse};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`Transport`] implementation over a shared [`reqwest::Client`].
///
/// The client only carries a connect timeout; the overall per-attempt
/// deadline is enforced by the fetcher, so a slow body read is cut off
/// there rather than here.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client (rustls, 10 s connect
    /// timeout).
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client, keeping its pool and configuration.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| TransportError::Network(Box::new(err)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Network(Box::new(err)))?;

        tracing::trace!(%url, %status, bytes = body.len(), "transport response buffered");
        Ok(TransportResponse { status, body })
    }
}
