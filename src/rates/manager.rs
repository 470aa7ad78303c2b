//! Once-per-day refresh of the persisted rate snapshot

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::rates::error::{RateError, StoreError};
use crate::rates::provider::RateProvider;
use crate::rates::store::KeyValueStore;
use crate::rates::types::{RateSnapshot, RefreshOutcome, RefreshStatus};

/// Store key holding the ISO date of the last successful refresh
pub const DATE_KEY: &str = "currency_date";

/// Store key holding the JSON-encoded inverted rate table
pub const RATES_KEY: &str = "currency_rates";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct RateCacheManager<S: KeyValueStore> {
    store: Arc<S>,
    provider: Arc<dyn RateProvider>,
    currencies: Vec<String>,
    /// Day of the last remote attempt made by this process
    attempted_on: Mutex<Option<NaiveDate>>,
}

impl<S: KeyValueStore> RateCacheManager<S> {
    pub fn new(store: Arc<S>, provider: Arc<dyn RateProvider>, currencies: Vec<String>) -> Self {
        Self {
            store,
            provider,
            currencies,
            attempted_on: Mutex::new(None),
        }
    }

    /// Currency codes kept from each refresh, in display order
    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    /// Returns today's rates, refreshing from the provider when needed.
    pub async fn ensure_fresh_rates(&self) -> Result<RefreshOutcome, RateError> {
        self.ensure_fresh_rates_on(Utc::now().date_naive()).await
    }

    /// Same as [`Self::ensure_fresh_rates`] with an explicit current day.
    ///
    /// # Returns
    /// * `Cached` - the stored snapshot is dated `today`, no network call
    /// * `Updated` - a new snapshot was fetched and persisted
    /// * `Offline` - the fetch failed and the last stored snapshot is served
    /// * `Err` - the fetch failed and nothing is stored
    pub async fn ensure_fresh_rates_on(
        &self,
        today: NaiveDate,
    ) -> Result<RefreshOutcome, RateError> {
        let stored = self.read_snapshot().unwrap_or_else(|e| {
            warn!("Failed to read stored rates, treating as absent: {}", e);
            None
        });

        if let Some(snapshot) = stored.as_ref().filter(|s| s.is_current(today)) {
            debug!("Using cached rates from {}", snapshot.as_of_date);
            return Ok(RefreshOutcome {
                snapshot: snapshot.clone(),
                status: RefreshStatus::Cached,
            });
        }

        if !self.start_attempt(today) {
            debug!("Rates already requested today, not retrying");
            return stored
                .map(|snapshot| RefreshOutcome {
                    snapshot,
                    status: RefreshStatus::Offline,
                })
                .ok_or(RateError::CacheMiss);
        }

        match self.refresh(today).await {
            Ok(snapshot) => Ok(RefreshOutcome {
                snapshot,
                status: RefreshStatus::Updated,
            }),
            Err(e) if e.is_recoverable() => match stored {
                Some(snapshot) => {
                    warn!(
                        "Rate refresh failed, using rates from {}: {}",
                        snapshot.as_of_date, e
                    );
                    Ok(RefreshOutcome {
                        snapshot,
                        status: RefreshStatus::Offline,
                    })
                }
                None => {
                    error!("Rate refresh failed and no cached rates exist: {}", e);
                    Err(e)
                }
            },
            Err(e) => Err(e),
        }
    }

    /// Returns the stored snapshot without touching the network.
    pub fn cached_snapshot(&self) -> Result<RateSnapshot, RateError> {
        self.read_snapshot()?.ok_or(RateError::CacheMiss)
    }

    /// Records an attempt for `today`; false if one was already made.
    fn start_attempt(&self, today: NaiveDate) -> bool {
        let mut attempted_on = self
            .attempted_on
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if *attempted_on == Some(today) {
            return false;
        }
        *attempted_on = Some(today);
        true
    }

    async fn refresh(&self, today: NaiveDate) -> Result<RateSnapshot, RateError> {
        info!("Fetching currency rates for {}", today);

        let remote = self.provider.fetch_latest().await?;
        let snapshot = RateSnapshot::new(today, invert_rates(&remote, &self.currencies));

        match self.write_snapshot(&snapshot) {
            Ok(()) => info!(
                "Saved {} currency rates for {}",
                snapshot.rates.len(),
                today
            ),
            Err(e) => error!("Failed to persist rates for {}: {}", today, e),
        }
        Ok(snapshot)
    }

    /// Reads the stored snapshot; malformed values count as absent.
    fn read_snapshot(&self) -> Result<Option<RateSnapshot>, StoreError> {
        let Some(date) = self.store.get(DATE_KEY)? else {
            return Ok(None);
        };
        let Some(rates) = self.store.get(RATES_KEY)? else {
            return Ok(None);
        };

        let Ok(as_of_date) = NaiveDate::parse_from_str(&date, DATE_FORMAT) else {
            debug!("Ignoring malformed stored date: {:?}", date);
            return Ok(None);
        };
        let Ok(rates) = serde_json::from_str::<BTreeMap<String, f64>>(&rates) else {
            debug!("Ignoring malformed stored rates");
            return Ok(None);
        };

        Ok(Some(RateSnapshot::new(as_of_date, rates)))
    }

    fn write_snapshot(&self, snapshot: &RateSnapshot) -> Result<(), StoreError> {
        // A BTreeMap<String, f64> always serializes
        let rates = serde_json::to_string(&snapshot.rates).unwrap_or_default();
        self.store.set(RATES_KEY, &rates)?;
        self.store.set(
            DATE_KEY,
            &snapshot.as_of_date.format(DATE_FORMAT).to_string(),
        )?;
        Ok(())
    }
}

/// Converts USD-based provider rates into USD values per currency unit,
/// keeping only `currencies`.
///
/// Codes missing from `remote`, or with a rate that cannot be inverted,
/// are skipped.
pub fn invert_rates(remote: &HashMap<String, f64>, currencies: &[String]) -> BTreeMap<String, f64> {
    currencies
        .iter()
        .filter_map(|code| match remote.get(code) {
            Some(&rate) if rate.is_finite() && rate > 0.0 => Some((code.clone(), 1.0 / rate)),
            Some(&rate) => {
                warn!("Skipping {} with unusable rate {}", code, rate);
                None
            }
            None => {
                debug!("Provider has no rate for {}", code);
                None
            }
        })
        .collect()
}
