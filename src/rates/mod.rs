//! Daily currency rate refresh with offline fallback
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │ RateProvider │────▶│ RateCacheManager │────▶│ UnitRegistry │
//! │   (fetch)    │     │ (refresh policy) │     │  (currency)  │
//! └──────────────┘     └──────────────────┘     └──────────────┘
//!                               │
//!                               ▼
//!                      ┌──────────────────┐
//!                      │  KeyValueStore   │
//!                      │(snapshot storage)│
//!                      └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`manager`]: Refresh-once-per-day policy and stale fallback
//! - [`provider`]: Trait for fetching USD-based rates
//! - [`providers`]: Concrete rate providers
//! - [`store`]: Key-value store trait with in-memory and SQLite implementations
//! - [`types`]: `RateSnapshot` and refresh status
//! - [`error`]: Error types for refresh and storage

pub mod error;
pub mod manager;
pub mod provider;
pub mod providers;
pub mod store;
pub mod types;

pub use error::{RateError, StoreError};
pub use manager::RateCacheManager;
pub use provider::RateProvider;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use types::{RateSnapshot, RefreshOutcome, RefreshStatus};
