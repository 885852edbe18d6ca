//! Shared helpers for API client tests against a wiremock server.

#![allow(dead_code)]

use passvault_cloud::{ApiConfig, EntryUpsert, VaultApiClient};
use passvault_crypto::KdfParams;
use passvault_vault::{EntryDraft, KeyManager, VaultMetaRecord};
use wiremock::MockServer;
use zeroize::Zeroizing;

pub fn client_for(server: &MockServer) -> VaultApiClient {
    VaultApiClient::new(ApiConfig::with_base_url(server.uri())).unwrap()
}

/// Key manager with cheap KDF params and an unlocked fresh vault.
/// Returns the metadata record that vault would have persisted.
pub fn unlocked_keys(password: &str) -> (KeyManager, VaultMetaRecord) {
    let keys = KeyManager::new().with_kdf_params(KdfParams::new(256, 1, 1));
    let record = keys
        .setup(password, &VaultMetaRecord::unconfigured())
        .unwrap()
        .to_record();
    (keys, record)
}

pub fn draft(title: &str, category: &str, secret: &str) -> EntryDraft {
    EntryDraft {
        title: title.into(),
        username: format!("{}@example.com", title.to_lowercase()),
        url: format!("https://{}.example", title.to_lowercase()),
        category: category.into(),
        notes: String::new(),
        secret: Zeroizing::new(secret.into()),
    }
}

/// Server-side JSON for an entry whose secret is sealed under `keys`.
pub fn entry_json(keys: &KeyManager, id: u64, title: &str, category: &str, secret: &str) -> serde_json::Value {
    let sealed = keys.seal_entry(&draft(title, category, secret)).unwrap();
    let mut json = serde_json::to_value(EntryUpsert::from_sealed(&sealed, None)).unwrap();
    json["id"] = id.into();
    json
}
