//! Envelope-encrypted vault core for PassVault.
//!
//! The master password derives a KEK (Argon2id) that wraps a random DEK.
//! Only the wrapped DEK, its nonce, the salt and the KDF params leave the
//! process, as [`VaultMetaRecord`]. The unwrapped DEK lives in a
//! [`VaultSession`] slot for as long as the vault is unlocked, and entry
//! secrets are encrypted under it.
//!
//! - [`KeyManager`] owns the DEK lifecycle: setup, unlock, lock, and
//!   per-entry encrypt/decrypt.
//! - [`VaultGate`] is the state machine deciding between first-time setup
//!   and unlock based on the remote metadata.
//! - [`VaultMetaStore`] is the seam to the remote service that stores the
//!   metadata record.

pub mod entry;
mod error;
pub mod gate;
mod keys;
pub mod metadata;
mod session;
pub mod store;

pub use entry::{
    count_in_category, filter_entries, DecryptedEntry, EntryDraft, EntryFields, SealedEntry,
    VaultEntry, ALL_CATEGORIES,
};
pub use error::{VaultError, VaultResult};
pub use gate::{GateEvent, GateFeedback, GateState, VaultGate};
pub use keys::{open_wrapped_dek, KeyAttempt, KeyManager, PendingSetup};
pub use metadata::{VaultMetaRecord, VaultMetadata};
pub use session::VaultSession;
pub use store::{MetaStoreError, VaultMetaStore};
