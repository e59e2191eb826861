//! The concrete HTTP transport adapter: a `reqwest`-backed implementation of
//! `logrelay_core::Transport`.

use std::time::Duration;

use async_trait::async_trait;
use logrelay_core::{SendOutcome, Transport};
use reqwest::Client;

/// Sends packets and probes target health over HTTP via `reqwest`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport over a fresh `reqwest::Client`.
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, url: &str, body: &[u8], timeout: Duration) -> SendOutcome {
        let result = self.client.post(url).timeout(timeout).body(body.to_vec()).send().await;

        match result {
            Ok(response) => SendOutcome::Ok(response.status().as_u16()),
            Err(err) if err.is_timeout() => SendOutcome::Timeout,
            Err(err) => {
                tracing::debug!(url, error = %err, "transport send failed");
                SendOutcome::NetworkError
            }
        }
    }

    async fn probe(&self, url: &str, timeout: Duration) -> bool {
        match self.client.get(url).timeout(timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(url, error = %err, "health probe failed");
                false
            }
        }
    }
}
