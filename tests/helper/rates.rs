//! Rate provider test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use unit_converter::rates::manager::{DATE_KEY, RATES_KEY};
use unit_converter::rates::{KeyValueStore, RateError, RateProvider, SqliteStore};

/// Rate provider returning canned rates, or rejecting every response, and
/// counting calls
pub struct MockRateProvider {
    rates: Option<HashMap<String, f64>>,
    calls: AtomicUsize,
}

impl MockRateProvider {
    pub fn with_rates(rates: &[(&str, f64)]) -> Self {
        Self {
            rates: Some(
                rates
                    .iter()
                    .map(|(code, rate)| (code.to_string(), *rate))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            rates: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for MockRateProvider {
    async fn fetch_latest(&self) -> Result<HashMap<String, f64>, RateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rates
            .clone()
            .ok_or_else(|| RateError::Parse("Missing rates field".to_string()))
    }
}

/// Typical provider payload: units per 1 USD
pub fn usd_rates() -> Vec<(&'static str, f64)> {
    vec![
        ("USD", 1.0),
        ("TWD", 32.0),
        ("JPY", 160.0),
        ("EUR", 0.8),
        ("GBP", 0.8),
        ("KRW", 1250.0),
        ("CNY", 8.0),
        ("CHF", 0.9),
    ]
}

pub fn default_currencies() -> Vec<String> {
    ["TWD", "USD", "JPY", "EUR", "GBP", "KRW", "CNY"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Create a SQLite key-value store, optionally holding a snapshot
pub fn create_test_store(snapshot: Option<(&str, &str)>) -> (TempDir, Arc<SqliteStore>) {
    let temp_dir = TempDir::new().unwrap();
    let store = SqliteStore::new(&temp_dir.path().join("rates.db")).unwrap();

    if let Some((date, rates)) = snapshot {
        store.set(DATE_KEY, date).unwrap();
        store.set(RATES_KEY, rates).unwrap();
    }

    (temp_dir, Arc::new(store))
}
