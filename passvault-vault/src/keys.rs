//! Envelope key management: DEK setup, wrap/unwrap, lock.

use crate::error::{VaultError, VaultResult};
use crate::metadata::{VaultMetaRecord, VaultMetadata};
use crate::session::VaultSession;
use passvault_crypto::{
    decrypt, decrypt_string, derive_key, encrypt, encrypt_string, generate_random_key,
    CryptoError, EncryptedData, KdfParams, Salt, SymmetricKey,
};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Owns the DEK lifecycle for one vault session.
///
/// Clones share the session slot and the attempt slot, so a clone can be
/// moved onto a blocking thread for the KDF while the original keeps
/// serving entry operations.
#[derive(Clone)]
pub struct KeyManager {
    session: VaultSession,
    /// KDF policy for vaults created by this manager. Existing vaults
    /// always use the params in their metadata.
    kdf_params: KdfParams,
    /// Held for the duration of an unlock or setup attempt.
    attempt_slot: Arc<Mutex<()>>,
}

/// Exclusive right to install a DEK, taken at the start of an unlock or
/// setup attempt.
pub struct KeyAttempt {
    _slot: OwnedMutexGuard<()>,
    generation: u64,
}

/// A freshly generated vault that has not been installed in the session
/// yet. Dropping it discards (and zeroizes) the DEK.
pub struct PendingSetup {
    metadata: VaultMetadata,
    dek: SymmetricKey,
}

impl PendingSetup {
    pub fn metadata(&self) -> &VaultMetadata {
        &self.metadata
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyManager {
    /// A manager with a fresh, locked session and the default KDF policy.
    pub fn new() -> Self {
        Self::with_session(VaultSession::new())
    }

    pub fn with_session(session: VaultSession) -> Self {
        Self {
            session,
            kdf_params: KdfParams::default(),
            attempt_slot: Arc::new(Mutex::new(())),
        }
    }

    /// Overrides the KDF policy used for new vaults.
    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.kdf_params = params;
        self
    }

    pub fn session(&self) -> &VaultSession {
        &self.session
    }

    pub fn kdf_params(&self) -> KdfParams {
        self.kdf_params
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_unlocked()
    }

    /// Starts an unlock or setup attempt.
    ///
    /// Only one attempt may be in flight; a second one is rejected with
    /// [`VaultError::UnlockInProgress`].
    pub fn begin_attempt(&self) -> VaultResult<KeyAttempt> {
        let slot = Arc::clone(&self.attempt_slot)
            .try_lock_owned()
            .map_err(|_| VaultError::UnlockInProgress)?;
        Ok(KeyAttempt {
            _slot: slot,
            generation: self.session.generation(),
        })
    }

    /// Abandons any in-flight attempt: its result will not be installed.
    pub fn cancel_pending(&self) {
        self.session.cancel_pending();
        debug!("pending vault attempts cancelled");
    }

    /// Generates salt and DEK and wraps the DEK under a KEK derived from
    /// `password`. Does not touch the session.
    ///
    /// Rejects with [`VaultError::AlreadyConfigured`] when `current` says the
    /// vault already exists or a DEK is already held: a second setup would
    /// orphan every entry encrypted under the first DEK.
    pub fn prepare_setup(
        &self,
        password: &str,
        current: &VaultMetaRecord,
    ) -> VaultResult<PendingSetup> {
        if current.is_configured() || self.session.is_unlocked() {
            return Err(VaultError::AlreadyConfigured);
        }

        let salt = Salt::random();
        let kek = derive_key(password, &salt, &self.kdf_params).map_err(VaultError::Crypto)?;
        let dek = generate_random_key();
        let wrapped_dek = encrypt(&kek, dek.as_bytes()).map_err(VaultError::Crypto)?;

        Ok(PendingSetup {
            metadata: VaultMetadata {
                salt,
                kdf_params: self.kdf_params,
                wrapped_dek,
            },
            dek,
        })
    }

    /// Installs the DEK of a setup whose metadata has been persisted.
    pub fn complete_setup(
        &self,
        pending: PendingSetup,
        attempt: KeyAttempt,
    ) -> VaultResult<Arc<SymmetricKey>> {
        let PendingSetup { dek, .. } = pending;
        let dek = self.install(dek, attempt)?;
        info!("vault setup completed");
        Ok(dek)
    }

    /// First-time setup in one step.
    ///
    /// Returns the metadata the caller must persist; the DEK is installed
    /// in the session.
    pub fn setup(&self, password: &str, current: &VaultMetaRecord) -> VaultResult<VaultMetadata> {
        let attempt = self.begin_attempt()?;
        let pending = self.prepare_setup(password, current)?;
        let metadata = pending.metadata().clone();
        self.complete_setup(pending, attempt)?;
        Ok(metadata)
    }

    /// Unlocks the vault described by `meta` with `password`.
    ///
    /// Wrong password and a tampered wrapped DEK both give
    /// [`VaultError::InvalidPassword`]; the session stays locked.
    pub fn unlock(&self, password: &str, meta: &VaultMetaRecord) -> VaultResult<Arc<SymmetricKey>> {
        let attempt = self.begin_attempt()?;
        let metadata = meta.decode()?;
        let dek = open_wrapped_dek(password, &metadata)?;
        self.finish_unlock(attempt, dek)
    }

    /// Installs a DEK unwrapped off-thread, unless the attempt went stale.
    pub fn finish_unlock(
        &self,
        attempt: KeyAttempt,
        dek: SymmetricKey,
    ) -> VaultResult<Arc<SymmetricKey>> {
        let dek = self.install(dek, attempt)?;
        info!("vault unlocked");
        Ok(dek)
    }

    fn install(&self, dek: SymmetricKey, attempt: KeyAttempt) -> VaultResult<Arc<SymmetricKey>> {
        self.session
            .install(dek, attempt.generation)
            .inspect_err(|_| debug!("discarding key from stale vault attempt"))
    }

    /// Discards the in-memory DEK.
    pub fn lock(&self) {
        self.session.clear();
        info!("vault locked");
    }

    /// Encrypts an entry secret under the session DEK.
    pub fn encrypt_entry_secret(&self, plaintext: &str) -> VaultResult<EncryptedData> {
        let dek = self.session.dek()?;
        encrypt_string(&dek, plaintext).map_err(VaultError::Crypto)
    }

    /// Decrypts an entry secret with the session DEK.
    pub fn decrypt_entry_secret(&self, data: &EncryptedData) -> VaultResult<Zeroizing<String>> {
        let dek = self.session.dek()?;
        decrypt_string(&dek, data)
            .map(Zeroizing::new)
            .map_err(VaultError::Crypto)
    }
}

/// Derives the KEK from `password` and unwraps the DEK in `meta`.
///
/// CPU-bound (Argon2id); callers on an async runtime should run it on a
/// blocking thread.
pub fn open_wrapped_dek(password: &str, meta: &VaultMetadata) -> VaultResult<SymmetricKey> {
    let kek = derive_key(password, &meta.salt, &meta.kdf_params)
        .map_err(|e| VaultError::MalformedMetadata(e.to_string()))?;

    let plaintext = Zeroizing::new(decrypt(&kek, &meta.wrapped_dek).map_err(|e| match e {
        CryptoError::Authentication => {
            warn!("vault unlock rejected");
            VaultError::InvalidPassword
        }
        other => VaultError::Crypto(other),
    })?);

    SymmetricKey::from_slice(&plaintext)
        .map_err(|e| VaultError::MalformedMetadata(format!("wrapped DEK: {e}")))
}
