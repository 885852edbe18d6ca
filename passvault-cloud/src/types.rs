//! Wire types for the entry endpoints.

use crate::error::{CloudError, CloudResult};
use passvault_crypto::encoding::{from_base64, to_base64};
use passvault_crypto::EncryptedData;
use passvault_vault::{SealedEntry, VaultEntry};
use serde::{Deserialize, Deserializer, Serialize};

/// An entry as returned by `GET /vault/entries/*`.
///
/// The secret travels as base64 ciphertext (tag appended) plus base64
/// nonce; everything else is plaintext.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub website: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category_name: String,
    #[serde(default)]
    pub password_cipher: Option<String>,
    #[serde(default)]
    pub password_iv: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Body of `POST /vault/entries/create` and `PATCH /vault/entries/update/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryUpsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub website: String,
    pub email: String,
    pub category_name: String,
    pub password_cipher: String,
    pub password_iv: String,
    pub note: String,
}

/// Accepts `"id": 17` as well as `"id": "17"`.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(n) => n.to_string(),
    })
}

/// Older rows carry `null` for plaintext fields the user left blank.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl EntryRecord {
    /// Decodes the secret fields into a [`VaultEntry`].
    pub fn into_vault_entry(self) -> CloudResult<VaultEntry> {
        let secret = self.decode_secret()?;
        Ok(VaultEntry {
            id: self.id,
            title: self.title,
            username: self.email,
            url: self.website,
            category: self.category_name,
            notes: self.note.unwrap_or_default(),
            secret,
        })
    }

    fn decode_secret(&self) -> CloudResult<EncryptedData> {
        let malformed = |reason: String| CloudError::MalformedEntry {
            id: self.id.clone(),
            reason,
        };

        let (Some(cipher), Some(iv)) = (&self.password_cipher, &self.password_iv) else {
            return Err(malformed("missing password cipher".into()));
        };
        let ciphertext =
            from_base64(cipher).map_err(|e| malformed(format!("passwordCipher: {e}")))?;
        let nonce = from_base64(iv).map_err(|e| malformed(format!("passwordIv: {e}")))?;
        EncryptedData::from_parts(ciphertext, &nonce)
            .map_err(|e| malformed(format!("passwordIv: {e}")))
    }
}

impl EntryUpsert {
    /// Wire body for a sealed entry; `id` is set when editing.
    pub fn from_sealed(entry: &SealedEntry, id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            title: entry.title.clone(),
            website: entry.url.clone(),
            email: entry.username.clone(),
            category_name: entry.category.clone(),
            password_cipher: to_base64(&entry.secret.ciphertext),
            password_iv: to_base64(entry.secret.nonce),
            note: entry.notes.clone(),
        }
    }
}
