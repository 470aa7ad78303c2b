//! Provider trait for fetching the latest currency rates

use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;

use crate::rates::error::RateError;

/// Trait for fetching rates from a remote source
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rates relative to USD
    ///
    /// # Returns
    /// * `Ok(HashMap)` - Currency code to number of units per 1 USD
    /// * `Err(RateError)` - `Network` or `Parse` if the fetch fails
    async fn fetch_latest(&self) -> Result<HashMap<String, f64>, RateError>;
}
