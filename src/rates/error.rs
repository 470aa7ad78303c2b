use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error("No cached rate snapshot")]
    CacheMiss,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RateError {
    /// Whether a stale snapshot may stand in for a failed refresh
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RateError::Network(_) | RateError::Parse(_))
    }
}
