//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors produced by the encryption primitives.
///
/// None of the variants carry key material or plaintext.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Tag mismatch. Wrong key, wrong nonce and tampered ciphertext all
    /// surface as this one variant.
    #[error("authentication failed (wrong key or tampered data)")]
    Authentication,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid salt length: expected {expected}, got {actual}")]
    InvalidSaltLength { expected: usize, actual: usize },

    #[error("invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("invalid base64: {0}")]
    Encoding(String),
}
