use std::future::Future;
use std::time::Duration;

use guard_proto::HazardZone;
use serde::Deserialize;

use crate::wire::ZonesResponse;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("directory returned HTTP {0}")]
    Status(u16),
    #[error("directory request timed out")]
    Timeout,
    #[error("directory unreachable: {0}")]
    Transport(String),
    #[error("malformed directory response: {0}")]
    Decode(String),
}

/// Remote store of hazard zones. Pull only; there is no push channel, so the
/// zone cache polls this on a fixed cadence.
pub trait ZoneDirectory {
    fn fetch_zones(&self) -> impl Future<Output = Result<Vec<HazardZone>, FetchError>> + Send;
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    pub endpoint: String,
    pub timeout_s: u64,
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }
}

/// HTTP client for the flood-zone directory API. The endpoint serves
/// `{"flood": [zone, ...]}`; every request carries the configured timeout so
/// a dead directory cannot stall a refresh indefinitely.
#[derive(Clone)]
pub struct HttpZoneDirectory {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpZoneDirectory {
    pub fn new(cfg: &DirectoryConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { endpoint: cfg.endpoint.clone(), client })
    }
}

impl ZoneDirectory for HttpZoneDirectory {
    async fn fetch_zones(&self) -> Result<Vec<HazardZone>, FetchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await.map_err(classify)?;
        let parsed: ZonesResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(parsed.into_zones())
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e.to_string())
    }
}
