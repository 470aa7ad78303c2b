//! Network access for the offline asset cache

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::assets::error::AssetError;
use crate::assets::types::AssetResponse;
use crate::config::FETCH_TIMEOUT_MS;

/// Trait for fetching a single asset from the network
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetches `url`, returning the response whatever its status
    async fn fetch(&self, url: &str) -> Result<AssetResponse, AssetError>;
}

/// Fetcher implementation using reqwest
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("unit-converter")
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpAssetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<AssetResponse, AssetError> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(AssetResponse {
            url: url.to_string(),
            status,
            content_type,
            body,
        })
    }
}
