//! Entry operations that cross the encryption boundary.

use crate::api_client::VaultApiClient;
use crate::error::CloudResult;
use crate::types::{EntryRecord, EntryUpsert};
use passvault_vault::{DecryptedEntry, EntryDraft, KeyManager, ALL_CATEGORIES};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Loads, saves and deletes vault entries, decrypting and encrypting the
/// secret field with the session DEK held by `keys`.
///
/// Every operation that touches a secret fails with
/// [`VaultError::Locked`](passvault_vault::VaultError::Locked) before any
/// request is sent when the vault is locked.
#[derive(Clone)]
pub struct EntryService {
    client: VaultApiClient,
    keys: KeyManager,
    /// Display category name to the name the server filters on.
    category_names: Arc<HashMap<String, String>>,
}

impl EntryService {
    pub fn new(client: VaultApiClient, keys: KeyManager) -> Self {
        Self {
            client,
            keys,
            category_names: Arc::default(),
        }
    }

    /// Sets the server-side names used when querying by category. Names
    /// without a mapping are sent unchanged.
    pub fn with_category_names<I, K, V>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.category_names = Arc::new(
            names
                .into_iter()
                .map(|(display, server)| (display.into(), server.into()))
                .collect(),
        );
        self
    }

    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    pub async fn load_all(&self) -> CloudResult<Vec<DecryptedEntry>> {
        self.keys.session().dek()?;
        let records = self.client.list_entries().await?;
        self.open_records(records)
    }

    /// Entries in `category`. [`ALL_CATEGORIES`] loads everything.
    ///
    /// `category` is translated through [`with_category_names`](Self::with_category_names)
    /// before it is sent.
    pub async fn load_category(&self, category: &str) -> CloudResult<Vec<DecryptedEntry>> {
        if category == ALL_CATEGORIES {
            return self.load_all().await;
        }
        self.keys.session().dek()?;
        let server_name = self
            .category_names
            .get(category)
            .map_or(category, String::as_str);
        let records = self.client.list_category(server_name).await?;
        self.open_records(records)
    }

    /// Creates an entry, or replaces `editing_id` when set. The secret is
    /// encrypted under a fresh nonce either way.
    pub async fn save(&self, draft: &EntryDraft, editing_id: Option<&str>) -> CloudResult<()> {
        let sealed = self.keys.seal_entry(draft)?;
        let body = EntryUpsert::from_sealed(&sealed, editing_id);

        match editing_id {
            Some(id) => {
                self.client.update_entry(id, &body).await?;
                info!(entry_id = id, "vault entry updated");
            }
            None => {
                self.client.create_entry(&body).await?;
                info!("vault entry created");
            }
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> CloudResult<()> {
        self.client.delete_entry(id).await?;
        info!(entry_id = id, "vault entry deleted");
        Ok(())
    }

    fn open_records(&self, records: Vec<EntryRecord>) -> CloudResult<Vec<DecryptedEntry>> {
        debug!(count = records.len(), "decrypting vault entries");
        records
            .into_iter()
            .map(|record| -> CloudResult<DecryptedEntry> {
                let entry = record.into_vault_entry()?;
                Ok(self.keys.open_entry(&entry)?)
            })
            .collect()
    }
}
