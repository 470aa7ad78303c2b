//! Unit converter with daily currency rates and an offline asset cache
//!
//! # Modules
//!
//! - [`units`]: Unit tables, registry and conversion
//! - [`rates`]: Currency rate refresh and snapshot persistence
//! - [`assets`]: Versioned offline cache for static assets
//! - [`app`]: Converter widget handlers
//! - [`config`]: Constants, paths and the JSON config file

pub mod app;
pub mod assets;
pub mod config;
pub mod rates;
pub mod units;
