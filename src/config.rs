use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for HTTP requests in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// Remote rate provider
// =============================================================================

/// Endpoint returning the latest rates relative to USD
pub const DEFAULT_RATES_ENDPOINT: &str = "https://open.er-api.com/v6/latest/USD";

/// Currencies offered by the currency category, in display order
pub const DEFAULT_CURRENCIES: &[&str] = &["TWD", "USD", "JPY", "EUR", "GBP", "KRW", "CNY"];

// =============================================================================
// Offline assets
// =============================================================================

/// Bump this to force clients to replace their cached assets
pub const DEFAULT_ASSET_CACHE_VERSION: &str = "converter-v2";

/// Base URL the relative manifest entries are resolved against
pub const DEFAULT_ASSET_BASE_URL: &str = "http://localhost:8080/";

pub const DEFAULT_ASSET_MANIFEST: &[&str] = &[
    "./",
    "./index.html",
    "./style.css",
    "./app.js",
    "./manifest.json",
    "./icon.png",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Application configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub rates: RatesConfig,
    pub assets: AssetsConfig,
}

/// Currency rate refresh configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RatesConfig {
    /// URL of the USD-based rate endpoint
    pub endpoint: String,
    /// Currency codes to keep from each refresh
    pub currencies: Vec<String>,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RATES_ENDPOINT.to_string(),
            currencies: DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Offline asset cache configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetsConfig {
    pub cache_version: String,
    pub base_url: String,
    pub manifest: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            cache_version: DEFAULT_ASSET_CACHE_VERSION.to_string(),
            base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            manifest: DEFAULT_ASSET_MANIFEST
                .iter()
                .map(|u| u.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from a JSON file.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns the path to the data directory for unit-converter.
/// Uses $XDG_DATA_HOME/unit-converter if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/unit-converter,
/// or ./unit-converter if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the rate snapshot database.
pub fn rates_db_path() -> PathBuf {
    data_dir().join("rates.db")
}

/// Returns the path to the offline asset database.
pub fn assets_db_path() -> PathBuf {
    data_dir().join("assets.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("unit-converter.log")
}

/// Returns the path to the optional config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("unit-converter")
        .join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("unit-converter")
}
