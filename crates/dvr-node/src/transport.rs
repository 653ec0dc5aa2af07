//! Outbound delivery over HTTP.

use async_trait::async_trait;
use std::time::Duration;

use dvr_routing::{PeerAddr, RoutingError, Transport, UpdateMessage};

/// Posts updates to `http://<neighbor>/receive_update`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn deliver(
        &self,
        neighbor: &PeerAddr,
        message: &UpdateMessage,
    ) -> Result<(), RoutingError> {
        let url = format!("http://{neighbor}/receive_update");
        let failure = |reason: String| RoutingError::DeliveryFailure {
            neighbor: neighbor.to_string(),
            reason,
        };

        let resp = self
            .client
            .post(&url)
            .json(message)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(failure(format!("HTTP {}", resp.status())));
        }
        Ok(())
    }
}
