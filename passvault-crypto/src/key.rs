//! Key material and Argon2id key derivation.

use crate::error::{CryptoError, CryptoResult};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of every symmetric key (KEK and DEK) in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the per-vault Argon2id salt in bytes.
pub const SALT_SIZE: usize = 16;

// Upper bounds for parameters read back from vault metadata. Stored
// params come from the server, so they are capped before Argon2 allocates.
const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;
const MAX_ITERATIONS: u32 = 100;
const MAX_PARALLELISM: u32 = 64;

/// A 256-bit symmetric key, zeroized on drop.
///
/// `Debug` never prints the key bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a key from a slice, rejecting anything that is not 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Generates a fresh random key (used for DEKs).
pub fn generate_random_key() -> SymmetricKey {
    let mut key = SymmetricKey([0u8; KEY_SIZE]);
    rand::rng().fill_bytes(&mut key.0);
    key
}

/// Argon2id salt. Not secret; persisted with the vault metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; SALT_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::InvalidSaltLength {
                expected: SALT_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// Argon2id cost parameters.
///
/// Serialized with the field names used in vault metadata
/// (`memory`, `iterations`, `parallelism`). Once a vault exists its params
/// are read back verbatim; `Default` only applies to new vaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    #[serde(rename = "memory")]
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    /// Checks the parameter ranges before any derivation is attempted.
    pub fn validate(&self) -> CryptoResult<()> {
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(CryptoError::InvalidKdfParams(format!(
                "iterations must be in 1..={MAX_ITERATIONS}, got {}",
                self.iterations
            )));
        }
        if self.parallelism == 0 || self.parallelism > MAX_PARALLELISM {
            return Err(CryptoError::InvalidKdfParams(format!(
                "parallelism must be in 1..={MAX_PARALLELISM}, got {}",
                self.parallelism
            )));
        }
        // Argon2 needs at least 8 KiB per lane.
        let min_memory = 8 * self.parallelism;
        if self.memory_kib < min_memory || self.memory_kib > MAX_MEMORY_KIB {
            return Err(CryptoError::InvalidKdfParams(format!(
                "memory must be in {min_memory}..={MAX_MEMORY_KIB} KiB, got {}",
                self.memory_kib
            )));
        }
        Ok(())
    }
}

/// Derives a 256-bit key from a password with Argon2id (v1.3).
///
/// Deterministic: the same password, salt and params always produce the
/// same key.
pub fn derive_key(password: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<SymmetricKey> {
    params.validate()?;

    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::InvalidKdfParams(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut key = SymmetricKey([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut key.0)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(key)
}
