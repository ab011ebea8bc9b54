//! Error types shared by the remote client and the playlist engine.

use thiserror::Error;

/// Errors that can occur while talking to the streaming service or while
/// materializing a playlist.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The bearer credential was rejected (expired or invalid)
    #[error("Credential rejected ({status}): {message}")]
    Credential { status: u16, message: String },

    /// A lookup returned no result
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the remote service
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Any other non-success response
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A run configuration that cannot be executed safely
    #[error("Invalid run configuration: {0}")]
    InvalidConfig(String),

    /// A random-source strategy found nothing to draw from
    #[error("No sources available: {0}")]
    NoSources(String),

    /// More unique elements were requested than the pool holds
    #[error("Cannot pick {requested} unique tracks from a pool of {available}")]
    SampleTooLarge { requested: usize, available: usize },

    /// IO error while reading or clearing the stored credential
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON
    #[error("Failed to parse JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    /// True for failures that must always reach the caller so it can force
    /// re-authentication.
    pub fn is_credential(&self) -> bool {
        matches!(self, Error::Credential { .. })
    }
}

/// Result type for client and engine operations.
pub type Result<T> = std::result::Result<T, Error>;
