use passvault_crypto::CryptoError;
use thiserror::Error;

pub type VaultResult<T> = Result<T, VaultError>;

/// Vault errors.
///
/// There is deliberately no `From<CryptoError>`: an AEAD authentication
/// failure while unwrapping the DEK must become [`VaultError::InvalidPassword`],
/// and that translation is always spelled out at the call site.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vault is locked")]
    Locked,
    #[error("invalid master password")]
    InvalidPassword,
    #[error("vault already configured")]
    AlreadyConfigured,
    #[error("vault not configured")]
    NotConfigured,
    #[error("vault data corrupted: {0}")]
    MalformedMetadata(String),
    #[error("failed to fetch vault metadata: {0}")]
    MetadataFetchFailed(String),
    #[error("failed to save vault metadata: {0}")]
    MetadataPersistFailed(String),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("another unlock attempt is in progress")]
    UnlockInProgress,
    #[error("unlock attempt superseded")]
    Superseded,
    #[error("crypto error: {0}")]
    Crypto(CryptoError),
    #[error("background task failed: {0}")]
    Task(String),
}
