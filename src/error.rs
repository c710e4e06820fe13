//! Error types for the wishlist sync engine

use thiserror::Error;

/// Result type alias for wishlist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the wishlist sync engine
#[derive(Debug, Error)]
pub enum Error {
    /// No identity bound and guest mode disabled, so there is nothing to operate on
    #[error("not configured: no identity and guest mode is disabled")]
    NotConfigured,

    /// Transport-level failure reaching the sync API
    #[error("network error: {0}")]
    Network(String),

    /// The sync API returned 429; callers should back off before retrying
    #[error("rate limited by sync API")]
    RateLimited,

    /// The sync API reported failure without a more specific reason
    #[error("sync failed: {0}")]
    SyncFailed(String),

    /// Local store inaccessible (quota, permissions, sandboxed context)
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Anything that does not fit the taxonomy above
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Whether this error indicates the caller should back off before retrying
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
