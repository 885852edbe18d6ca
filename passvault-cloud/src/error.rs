//! API client error types.

use passvault_vault::VaultError;
use thiserror::Error;

/// Result type for API operations.
pub type CloudResult<T> = Result<T, CloudError>;

#[derive(Debug, Error)]
pub enum CloudError {
    /// The server answered 403: the sign-in session is gone.
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("API request failed: {0}")]
    Api(String),

    #[error("malformed entry {id}: {reason}")]
    MalformedEntry { id: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
}
