//! Scripted transport for driving the fetcher deterministically.

use std::sync::Mutex;

use async_trait::async_trait;
use http::StatusCode;
use relaybox::{Transport, TransportError, TransportResponse};

/// What a matching URL should produce.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Respond with this status and body.
    Respond(u16, &'static str),
    /// Fail at the connection level.
    Network,
}

/// Transport that answers by substring-matching the requested URL against
/// registered rules, recording every call.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    rules: Vec<(String, Script)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule: any URL containing `pattern` runs `script`.
    /// Rules are checked in registration order; unmatched URLs fail with a
    /// network error.
    pub fn on(mut self, pattern: &str, script: Script) -> Self {
        self.rules.push((pattern.to_owned(), script));
        self
    }

    /// Number of calls whose URL contained `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }

    /// Total number of transport calls.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, url: &str) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_owned());
        for (pattern, script) in &self.rules {
            if url.contains(pattern) {
                return match script {
                    Script::Respond(status, body) => Ok(TransportResponse::new(
                        StatusCode::from_u16(*status).unwrap(),
                        body.as_bytes().to_vec(),
                    )),
                    Script::Network => Err(TransportError::Network(Box::new(
                        std::io::Error::other("scripted connection failure"),
                    ))),
                };
            }
        }
        Err(TransportError::Network(Box::new(std::io::Error::other(
            "no scripted rule matched",
        ))))
    }
}
