//! The in-memory DEK slot.

use crate::error::{VaultError, VaultResult};
use passvault_crypto::SymmetricKey;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide vault session holding the unwrapped DEK, if any.
///
/// Cloning shares the same slot. Starts locked and is never persisted.
/// Readers take a reference-counted handle to the key under a read lock,
/// so an entry operation sees either the old key or none, never a
/// partially updated slot.
#[derive(Clone, Default)]
pub struct VaultSession {
    dek: Arc<RwLock<Option<Arc<SymmetricKey>>>>,
    /// Bumped on every lock and cancellation. An unlock that started under
    /// an older generation must not install its key.
    generation: Arc<AtomicU64>,
}

impl VaultSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self) -> bool {
        self.dek
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns a handle to the current DEK, or [`VaultError::Locked`].
    pub fn dek(&self) -> VaultResult<Arc<SymmetricKey>> {
        self.dek
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(VaultError::Locked)
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Installs `dek` if no lock or cancellation happened since
    /// `generation` was observed.
    pub(crate) fn install(
        &self,
        dek: SymmetricKey,
        generation: u64,
    ) -> VaultResult<Arc<SymmetricKey>> {
        let mut slot = self.dek.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(VaultError::Superseded);
        }
        let dek = Arc::new(dek);
        *slot = Some(Arc::clone(&dek));
        Ok(dek)
    }

    /// Drops the DEK and invalidates in-flight attempts.
    pub(crate) fn clear(&self) {
        let mut slot = self.dek.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
        *slot = None;
    }

    /// Invalidates in-flight attempts without touching the current DEK.
    pub(crate) fn cancel_pending(&self) {
        let _slot = self.dek.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
