//! AES-256-GCM authenticated encryption.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag appended to every ciphertext.
pub const TAG_SIZE: usize = 16;

/// Ciphertext (tag appended) together with the nonce it was sealed under.
///
/// The two must always be persisted together; without the nonce the
/// ciphertext cannot be opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
}

impl EncryptedData {
    /// Reassembles a sealed value from its stored parts.
    pub fn from_parts(ciphertext: Vec<u8>, nonce: &[u8]) -> CryptoResult<Self> {
        let nonce: [u8; NONCE_SIZE] =
            nonce.try_into().map_err(|_| CryptoError::InvalidNonceLength {
                expected: NONCE_SIZE,
                actual: nonce.len(),
            })?;
        Ok(Self { ciphertext, nonce })
    }
}

fn cipher_for(key: &SymmetricKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypts `plaintext` under `key` with a freshly drawn random nonce.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce);

    let ciphertext = cipher_for(key)
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedData { ciphertext, nonce })
}

/// Decrypts and authenticates `data` under `key`.
///
/// Fails closed: any tag mismatch yields [`CryptoError::Authentication`]
/// and no plaintext.
pub fn decrypt(key: &SymmetricKey, data: &EncryptedData) -> CryptoResult<Vec<u8>> {
    cipher_for(key)
        .decrypt(Nonce::from_slice(&data.nonce), data.ciphertext.as_slice())
        .map_err(|_| CryptoError::Authentication)
}

/// Encrypts a UTF-8 string.
pub fn encrypt_string(key: &SymmetricKey, plaintext: &str) -> CryptoResult<EncryptedData> {
    encrypt(key, plaintext.as_bytes())
}

/// Decrypts to a UTF-8 string.
///
/// Authenticated bytes that are not valid UTF-8 are reported as an
/// authentication failure as well.
pub fn decrypt_string(key: &SymmetricKey, data: &EncryptedData) -> CryptoResult<String> {
    let bytes = decrypt(key, data)?;
    String::from_utf8(bytes).map_err(|e| {
        let mut bytes = e.into_bytes();
        zeroize::Zeroize::zeroize(&mut bytes);
        CryptoError::Authentication
    })
}
