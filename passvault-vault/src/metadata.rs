//! Vault metadata: the remote record and its decoded form.

use crate::error::{VaultError, VaultResult};
use passvault_crypto::encoding::{from_base64, to_base64};
use passvault_crypto::{EncryptedData, KdfParams, Salt};
use serde::{Deserialize, Serialize};

/// Vault metadata as stored by the remote service.
///
/// Binary fields are base64. An unconfigured vault is `{"access": false}`
/// with every other field absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultMetaRecord {
    #[serde(default)]
    pub access: bool,
    #[serde(rename = "cryptoSalt", default, skip_serializing_if = "Option::is_none")]
    pub crypto_salt: Option<String>,
    #[serde(rename = "cryptoKdfParams", default, skip_serializing_if = "Option::is_none")]
    pub crypto_kdf_params: Option<KdfParams>,
    #[serde(rename = "encryptedDEK", default, skip_serializing_if = "Option::is_none")]
    pub encrypted_dek: Option<String>,
    #[serde(rename = "encryptedDEK_iv", default, skip_serializing_if = "Option::is_none")]
    pub encrypted_dek_iv: Option<String>,
}

impl VaultMetaRecord {
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Whether first-time setup has already happened for this vault.
    pub fn is_configured(&self) -> bool {
        self.access
    }

    /// Decodes and validates the record.
    ///
    /// Fails with [`VaultError::NotConfigured`] when `access` is false and
    /// with [`VaultError::MalformedMetadata`] when a field is missing or
    /// does not decode. Nothing here depends on the password.
    pub fn decode(&self) -> VaultResult<VaultMetadata> {
        if !self.access {
            return Err(VaultError::NotConfigured);
        }

        let salt_b64 = required(&self.crypto_salt, "cryptoSalt")?;
        let kdf_params = self
            .crypto_kdf_params
            .ok_or_else(|| missing("cryptoKdfParams"))?;
        let dek_b64 = required(&self.encrypted_dek, "encryptedDEK")?;
        let iv_b64 = required(&self.encrypted_dek_iv, "encryptedDEK_iv")?;

        let salt = from_base64(salt_b64)
            .and_then(|bytes| Salt::from_slice(&bytes))
            .map_err(|e| malformed("cryptoSalt", e))?;
        kdf_params
            .validate()
            .map_err(|e| malformed("cryptoKdfParams", e))?;
        let ciphertext = from_base64(dek_b64).map_err(|e| malformed("encryptedDEK", e))?;
        let wrapped_dek = from_base64(iv_b64)
            .and_then(|nonce| EncryptedData::from_parts(ciphertext, &nonce))
            .map_err(|e| malformed("encryptedDEK_iv", e))?;

        Ok(VaultMetadata {
            salt,
            kdf_params,
            wrapped_dek,
        })
    }
}

fn required<'a>(field: &'a Option<String>, name: &str) -> VaultResult<&'a str> {
    field
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| missing(name))
}

fn missing(name: &str) -> VaultError {
    VaultError::MalformedMetadata(format!("missing {name}"))
}

fn malformed(name: &str, err: impl std::fmt::Display) -> VaultError {
    VaultError::MalformedMetadata(format!("{name}: {err}"))
}

/// Decoded vault metadata: everything needed to re-derive the DEK.
///
/// Immutable for the lifetime of a vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultMetadata {
    pub salt: Salt,
    pub kdf_params: KdfParams,
    pub wrapped_dek: EncryptedData,
}

impl VaultMetadata {
    /// Encodes into the wire record with `access: true`.
    pub fn to_record(&self) -> VaultMetaRecord {
        VaultMetaRecord {
            access: true,
            crypto_salt: Some(to_base64(self.salt.as_bytes())),
            crypto_kdf_params: Some(self.kdf_params),
            encrypted_dek: Some(to_base64(&self.wrapped_dek.ciphertext)),
            encrypted_dek_iv: Some(to_base64(self.wrapped_dek.nonce)),
        }
    }
}
