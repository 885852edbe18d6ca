//! Remote collaborators of the PassVault client.
//!
//! - [`VaultApiClient`] talks to the vault REST API: the metadata record
//!   and the entry endpoints. It implements
//!   [`VaultMetaStore`](passvault_vault::VaultMetaStore) so a
//!   [`VaultGate`](passvault_vault::VaultGate) can run against it.
//! - [`EntryService`] encrypts and decrypts entry secrets through a
//!   [`KeyManager`](passvault_vault::KeyManager) on their way to and from
//!   the API.

pub mod api_client;
pub mod config;
pub mod entries;
pub mod error;
pub mod types;

pub use api_client::VaultApiClient;
pub use config::ApiConfig;
pub use entries::EntryService;
pub use error::{CloudError, CloudResult};
pub use types::{EntryRecord, EntryUpsert};
