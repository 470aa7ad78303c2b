use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    BadStatus { url: String, status: u16 },

    /// A manifest entry could not be cached; the install is abandoned
    #[error("Failed to cache {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<AssetError>,
    },

    #[error("Invalid asset URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Cache version {0} is not installed")]
    NotInstalled(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Asset storage lock poisoned")]
    LockPoisoned,
}
