//! Shared helpers for vault integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use passvault_crypto::KdfParams;
use passvault_vault::{KeyManager, MetaStoreError, VaultMetaRecord, VaultMetaStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Routes gate and key-manager logs to the test output.
/// Filter with `RUST_LOG`, e.g. `RUST_LOG=passvault_vault=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Argon2id params cheap enough for a fast test suite.
pub fn cheap_params() -> KdfParams {
    KdfParams::new(256, 1, 1)
}

pub fn test_keys() -> KeyManager {
    KeyManager::new().with_kdf_params(cheap_params())
}

/// How a [`MemoryMetaStore`] call should fail, if at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fault {
    #[default]
    None,
    Unavailable,
    SignedOut,
}

impl Fault {
    fn check(self) -> Result<(), MetaStoreError> {
        match self {
            Fault::None => Ok(()),
            Fault::Unavailable => Err(MetaStoreError::Unavailable("connection reset".into())),
            Fault::SignedOut => Err(MetaStoreError::NotAuthenticated),
        }
    }
}

/// In-memory stand-in for the remote metadata endpoint.
#[derive(Default)]
pub struct MemoryMetaStore {
    record: Mutex<VaultMetaRecord>,
    fetch_fault: Mutex<Fault>,
    persist_fault: Mutex<Fault>,
    /// Cancels pending attempts on this manager when metadata is fetched,
    /// as if the gate were dismissed while the request was in flight.
    cancel_on_fetch: Mutex<Option<KeyManager>>,
    /// Same, but after a successful persist.
    cancel_on_persist: Mutex<Option<KeyManager>>,
    pub fetches: AtomicUsize,
    pub persists: AtomicUsize,
}

impl MemoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: VaultMetaRecord) -> Self {
        let store = Self::default();
        store.set_record(record);
        store
    }

    pub fn record(&self) -> VaultMetaRecord {
        self.record.lock().unwrap().clone()
    }

    pub fn set_record(&self, record: VaultMetaRecord) {
        *self.record.lock().unwrap() = record;
    }

    pub fn fail_fetch(&self, fault: Fault) {
        *self.fetch_fault.lock().unwrap() = fault;
    }

    pub fn fail_persist(&self, fault: Fault) {
        *self.persist_fault.lock().unwrap() = fault;
    }

    pub fn cancel_on_fetch(&self, keys: &KeyManager) {
        *self.cancel_on_fetch.lock().unwrap() = Some(keys.clone());
    }

    pub fn cancel_on_persist(&self, keys: &KeyManager) {
        *self.cancel_on_persist.lock().unwrap() = Some(keys.clone());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn persist_count(&self) -> usize {
        self.persists.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VaultMetaStore for MemoryMetaStore {
    async fn fetch_meta(&self) -> Result<VaultMetaRecord, MetaStoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(keys) = self.cancel_on_fetch.lock().unwrap().take() {
            keys.cancel_pending();
        }
        let fault = *self.fetch_fault.lock().unwrap();
        fault.check()?;
        Ok(self.record())
    }

    async fn persist_meta(&self, record: &VaultMetaRecord) -> Result<(), MetaStoreError> {
        self.persists.fetch_add(1, Ordering::SeqCst);
        let fault = *self.persist_fault.lock().unwrap();
        fault.check()?;
        self.set_record(record.clone());
        if let Some(keys) = self.cancel_on_persist.lock().unwrap().take() {
            keys.cancel_pending();
        }
        Ok(())
    }
}
