// Auxiliary third-party game status (players-online count)

use crate::hub_repo::FetchError;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct QueryStatus {
    players_online: u64,
}

pub struct McstatusRepo {
    client: reqwest::Client,
    url: String,
    /// Display name used when merging the value into the group list.
    pub name: String,
}

impl McstatusRepo {
    pub fn new(name: &str, url: &str, timeout_ms: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            name: name.to_string(),
        })
    }

    #[instrument(skip(self), fields(repo = "mcstatus", operation = "fetch_players_online"))]
    pub async fn fetch_players_online(&self) -> Result<u64, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text().await?;
        let status: QueryStatus = serde_json::from_str(&body)?;
        Ok(status.players_online)
    }
}
