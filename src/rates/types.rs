use std::collections::BTreeMap;

use chrono::NaiveDate;

/// The single persisted rate table and the day it was fetched
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub as_of_date: NaiveDate,
    /// Value of one unit of each currency expressed in USD
    pub rates: BTreeMap<String, f64>,
}

impl RateSnapshot {
    pub fn new(as_of_date: NaiveDate, rates: BTreeMap<String, f64>) -> Self {
        Self { as_of_date, rates }
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Whether the snapshot can be served without refreshing on `today`
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.as_of_date == today && !self.is_empty()
    }
}

/// How the snapshot returned by a refresh was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// Today's snapshot was already stored; no network call was made
    Cached,
    /// Fetched from the remote provider and persisted
    Updated,
    /// Remote fetch failed; serving the last stored snapshot
    Offline,
}

/// Result of `RateCacheManager::ensure_fresh_rates`
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    pub snapshot: RateSnapshot,
    pub status: RefreshStatus,
}

impl RefreshOutcome {
    /// Status line shown next to the converter
    pub fn status_message(&self) -> String {
        match self.status {
            RefreshStatus::Cached | RefreshStatus::Updated => {
                format!("Rates last updated: {}", self.snapshot.as_of_date)
            }
            RefreshStatus::Offline => format!(
                "Offline, using cached rates from {}",
                self.snapshot.as_of_date
            ),
        }
    }
}
