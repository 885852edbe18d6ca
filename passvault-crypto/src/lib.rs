//! Encryption layer for PassVault.
//!
//! Provides the two leaf primitives of the vault key hierarchy:
//! - Argon2id for deriving a key-encryption key (KEK) from the master password
//! - AES-256-GCM for authenticated encryption of opaque byte buffers
//!
//! # Architecture
//!
//! The vault uses envelope encryption:
//!
//! 1. **KEK**: Derived from the master password using Argon2id with the salt
//!    and cost parameters recorded in the vault metadata. Never stored.
//!
//! 2. **DEK**: A random key generated once per vault. It encrypts entry
//!    secrets and is itself stored only in wrapped (KEK-encrypted) form.
//!
//! Every encryption draws a fresh random 96-bit nonce. Ciphertexts carry the
//! 16-byte GCM tag appended, which is the layout browsers produce through
//! WebCrypto, so records written by other clients open here unchanged.

mod cipher;
pub mod encoding;
mod error;
mod key;

pub use cipher::{
    decrypt, decrypt_string, encrypt, encrypt_string, EncryptedData, NONCE_SIZE, TAG_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    derive_key, generate_random_key, KdfParams, Salt, SymmetricKey, KEY_SIZE, SALT_SIZE,
};
