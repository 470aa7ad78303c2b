//! open.er-api.com rate provider implementation

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{DEFAULT_RATES_ENDPOINT, FETCH_TIMEOUT_MS};
use crate::rates::error::RateError;
use crate::rates::provider::RateProvider;

/// Response from the `latest/USD` endpoint
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
    /// Non-numeric entries are dropped per code, not for the whole body
    rates: Option<HashMap<String, serde_json::Value>>,
}

/// Rate provider backed by the free, key-less ExchangeRate-API endpoint
pub struct ErApiProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl ErApiProvider {
    /// Creates a new ErApiProvider fetching from `endpoint`
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("unit-converter")
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: endpoint.to_string(),
        }
    }
}

impl Default for ErApiProvider {
    fn default() -> Self {
        Self::new(DEFAULT_RATES_ENDPOINT)
    }
}

#[async_trait::async_trait]
impl RateProvider for ErApiProvider {
    async fn fetch_latest(&self) -> Result<HashMap<String, f64>, RateError> {
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Rate provider returned status {}: {}", status, self.endpoint);
            return Err(RateError::Parse(format!("Unexpected status: {}", status)));
        }

        let body: LatestRatesResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse rate provider response: {}", e);
            RateError::Parse(e.to_string())
        })?;

        if body.result.as_deref() == Some("error") {
            let reason = body.error_type.unwrap_or_else(|| "unknown".to_string());
            return Err(RateError::Parse(format!("Provider error: {}", reason)));
        }

        let rates = body
            .rates
            .ok_or_else(|| RateError::Parse("Missing rates field".to_string()))?;

        Ok(rates
            .into_iter()
            .filter_map(|(code, value)| match value.as_f64().filter(|r| r.is_finite()) {
                Some(rate) => Some((code, rate)),
                None => {
                    debug!("Ignoring non-numeric rate for {}: {}", code, value);
                    None
                }
            })
            .collect())
    }
}
