//! Versioned offline cache for the widget's static assets
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │ AssetFetcher │────▶│ OfflineAssetCache│────▶│ AssetStorage │
//! │  (network)   │     │ (install/activate│     │  (versions)  │
//! └──────────────┘     │    /respond)     │     └──────────────┘
//!                      └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Lifecycle state machine serving cache-first responses
//! - [`fetcher`]: Trait and reqwest implementation for fetching assets
//! - [`storage`]: SQLite storage for cache versions and their entries
//! - [`types`]: Manifest, stored responses and lifecycle states
//! - [`error`]: Error types for install, activation and lookups

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod storage;
pub mod types;

pub use cache::OfflineAssetCache;
pub use error::AssetError;
pub use fetcher::{AssetFetcher, HttpAssetFetcher};
pub use storage::{AssetStorage, SqliteAssetStorage};
pub use types::{AssetManifest, AssetResponse, CacheState};
