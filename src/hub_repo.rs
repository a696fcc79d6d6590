// Server directory fetch via reqwest

use crate::models::{HubEntry, RawServer};
use std::time::Duration;
use tracing::instrument;

/// Transient fetch failures. All variants degrade to "no data this cycle";
/// the polling cadence itself is the retry interval.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct HubRepo {
    client: reqwest::Client,
    url: String,
}

impl HubRepo {
    pub fn new(url: &str, timeout_ms: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Fetches the full server list. Fails soft: any error yields no data
    /// for the cycle, never a partially populated list.
    #[instrument(skip(self), fields(repo = "hub", operation = "fetch_servers"))]
    pub async fn fetch_servers(&self) -> Result<Vec<RawServer>, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text().await?;
        let entries: Vec<HubEntry> = serde_json::from_str(&body)?;
        Ok(entries.into_iter().map(RawServer::from).collect())
    }
}
