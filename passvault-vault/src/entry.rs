//! Vault entries.
//!
//! Only the secret field is encrypted. Title, username, url, category and
//! notes stay plaintext so entries can be listed, searched and filtered
//! without the DEK.

use crate::error::VaultResult;
use crate::keys::KeyManager;
use passvault_crypto::EncryptedData;
use std::fmt;
use zeroize::Zeroizing;

/// Category name that matches every entry.
pub const ALL_CATEGORIES: &str = "All";

/// Plaintext metadata shared by every entry representation.
pub trait EntryFields {
    fn title(&self) -> &str;
    fn username(&self) -> &str;
    fn url(&self) -> &str;
    fn category(&self) -> &str;
}

/// User input for creating or editing an entry.
#[derive(Clone, Default)]
pub struct EntryDraft {
    pub title: String,
    pub username: String,
    pub url: String,
    pub category: String,
    pub notes: String,
    pub secret: Zeroizing<String>,
}

/// An entry ready to persist: metadata plus the encrypted secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedEntry {
    pub title: String,
    pub username: String,
    pub url: String,
    pub category: String,
    pub notes: String,
    pub secret: EncryptedData,
}

/// A persisted entry as loaded from storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultEntry {
    pub id: String,
    pub title: String,
    pub username: String,
    pub url: String,
    pub category: String,
    pub notes: String,
    pub secret: EncryptedData,
}

/// A loaded entry with its secret decrypted.
#[derive(Clone)]
pub struct DecryptedEntry {
    pub id: String,
    pub title: String,
    pub username: String,
    pub url: String,
    pub category: String,
    pub notes: String,
    pub secret: Zeroizing<String>,
}

impl fmt::Debug for EntryDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryDraft")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("url", &self.url)
            .field("category", &self.category)
            .field("secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for DecryptedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedEntry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("url", &self.url)
            .field("category", &self.category)
            .field("secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

macro_rules! impl_entry_fields {
    ($($ty:ty),*) => {$(
        impl EntryFields for $ty {
            fn title(&self) -> &str { &self.title }
            fn username(&self) -> &str { &self.username }
            fn url(&self) -> &str { &self.url }
            fn category(&self) -> &str { &self.category }
        }
    )*};
}

impl_entry_fields!(EntryDraft, SealedEntry, VaultEntry, DecryptedEntry);

impl KeyManager {
    /// Encrypts the draft's secret with a fresh nonce.
    ///
    /// Used for both create and edit; an edit never reuses the previous
    /// nonce.
    pub fn seal_entry(&self, draft: &EntryDraft) -> VaultResult<SealedEntry> {
        let secret = self.encrypt_entry_secret(&draft.secret)?;
        Ok(SealedEntry {
            title: draft.title.clone(),
            username: draft.username.clone(),
            url: draft.url.clone(),
            category: draft.category.clone(),
            notes: draft.notes.clone(),
            secret,
        })
    }

    pub fn open_entry(&self, entry: &VaultEntry) -> VaultResult<DecryptedEntry> {
        let secret = self.decrypt_entry_secret(&entry.secret)?;
        Ok(DecryptedEntry {
            id: entry.id.clone(),
            title: entry.title.clone(),
            username: entry.username.clone(),
            url: entry.url.clone(),
            category: entry.category.clone(),
            notes: entry.notes.clone(),
            secret,
        })
    }

    /// Decrypts a batch of entries, failing on the first error.
    pub fn open_entries(&self, entries: &[VaultEntry]) -> VaultResult<Vec<DecryptedEntry>> {
        entries.iter().map(|entry| self.open_entry(entry)).collect()
    }
}

/// Case-insensitive search over title, username and url.
///
/// An empty query matches everything.
pub fn filter_entries<'a, T: EntryFields>(entries: &'a [T], query: &str) -> Vec<&'a T> {
    let query = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            query.is_empty()
                || entry.title().to_lowercase().contains(&query)
                || entry.username().to_lowercase().contains(&query)
                || entry.url().to_lowercase().contains(&query)
        })
        .collect()
}

/// Number of entries in `category`; [`ALL_CATEGORIES`] counts everything.
pub fn count_in_category<T: EntryFields>(entries: &[T], category: &str) -> usize {
    if category == ALL_CATEGORIES {
        return entries.len();
    }
    entries
        .iter()
        .filter(|entry| entry.category() == category)
        .count()
}
