//! Vault session gate.
//!
//! Decides, from the remote metadata, whether the user must create a master
//! password or unlock with an existing one, and drives the [`KeyManager`]
//! accordingly.
//!
//! ```text
//! Checking ─┬─ configured ─────▶ Unlock ─┐
//!           ├─ not configured ─▶ Setup ──┴─▶ Unlocked
//!           └─ fetch failed ───▶ Error ── retry ──▶ Checking
//! ```
//!
//! Unlock falls into Error on failures the user cannot fix by retyping the
//! password. Setup never does: a vault that failed to save is still
//! unconfigured, so setup can simply be submitted again. A vault that did
//! save but whose key was not installed moves on to Unlock.
//!
//! [`GateState::transition`] is the pure state machine; [`VaultGate`] runs
//! the I/O and feeds it events.

use crate::error::{VaultError, VaultResult};
use crate::keys::{open_wrapped_dek, KeyManager};
use crate::metadata::VaultMetaRecord;
use crate::store::{MetaStoreError, VaultMetaStore};
use std::mem;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

/// User-visible outcome of a gate step.
///
/// A wrong password and a tampered wrapped DEK share
/// [`GateFeedback::WrongPassword`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateFeedback {
    PasswordRequired,
    PasswordMismatch,
    WrongPassword,
    AttemptInProgress,
    SaveFailed,
    SetupFailed,
    AlreadyConfigured,
    CheckFailed,
    OpenFailed,
    SignInRequired,
}

impl GateFeedback {
    pub fn message(self) -> &'static str {
        match self {
            Self::PasswordRequired => "Enter your master password.",
            Self::PasswordMismatch => "Passwords do not match.",
            Self::WrongPassword => "Wrong master password.",
            Self::AttemptInProgress => "Please wait, the vault is still opening.",
            Self::SaveFailed => "Could not save the vault. Try again.",
            Self::SetupFailed => "Could not create the vault.",
            Self::AlreadyConfigured => "This vault is already set up. Reopen it to unlock.",
            Self::CheckFailed => "Could not check the vault state.",
            Self::OpenFailed => "Could not open the vault.",
            Self::SignInRequired => "Your session has expired. Sign in again.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Setup { feedback: Option<GateFeedback> },
    Unlock { feedback: Option<GateFeedback> },
    Unlocked,
    Error { feedback: GateFeedback },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateEvent {
    /// The gate was (re)opened; `unlocked` tells whether a DEK is held.
    Opened { unlocked: bool },
    Retry,
    MetadataLoaded { configured: bool },
    MetadataFailed(GateFeedback),
    /// Retryable problem with the submitted input; stay and show feedback.
    Rejected(GateFeedback),
    /// Unlock failed for a reason other than the password.
    Failed(GateFeedback),
    /// Setup saved the metadata but the key was not installed. The vault
    /// exists now and only needs unlocking.
    Configured,
    /// The attempt was cancelled before its key could be installed.
    Superseded,
    Unlocked,
}

impl GateState {
    /// Applies `event`. Events that do not apply to the current state
    /// leave it unchanged.
    pub fn transition(self, event: GateEvent) -> GateState {
        use GateEvent as E;
        use GateState as S;

        match (self, event) {
            (_, E::Opened { unlocked: true }) => S::Unlocked,
            (_, E::Opened { unlocked: false }) => S::Checking,
            (S::Error { .. }, E::Retry) => S::Checking,
            (S::Checking, E::MetadataLoaded { configured: false }) => S::Setup { feedback: None },
            (S::Checking, E::MetadataLoaded { configured: true }) => S::Unlock { feedback: None },
            (S::Checking, E::MetadataFailed(feedback)) => S::Error { feedback },
            (S::Setup { .. }, E::Rejected(feedback)) => S::Setup {
                feedback: Some(feedback),
            },
            (S::Unlock { .. }, E::Rejected(feedback)) => S::Unlock {
                feedback: Some(feedback),
            },
            (S::Unlock { .. }, E::Failed(feedback)) => S::Error { feedback },
            (S::Setup { .. }, E::Configured) => S::Unlock { feedback: None },
            (S::Unlock { .. }, E::Superseded) => S::Unlock { feedback: None },
            (S::Setup { .. } | S::Unlock { .. }, E::Unlocked) => S::Unlocked,
            (state, _) => state,
        }
    }

    /// Whether the state is waiting for a master password.
    pub fn accepts_password(&self) -> bool {
        matches!(self, Self::Setup { .. } | Self::Unlock { .. })
    }

    pub fn feedback(&self) -> Option<GateFeedback> {
        match self {
            Self::Setup { feedback } | Self::Unlock { feedback } => *feedback,
            Self::Error { feedback } => Some(*feedback),
            Self::Checking | Self::Unlocked => None,
        }
    }
}

/// Drives [`GateState`] against a metadata store and a key manager.
pub struct VaultGate {
    store: Arc<dyn VaultMetaStore>,
    keys: KeyManager,
    state: GateState,
    /// Metadata from the last successful fetch.
    record: Option<VaultMetaRecord>,
    password: Zeroizing<String>,
    confirmation: Zeroizing<String>,
}

impl VaultGate {
    pub fn new(store: Arc<dyn VaultMetaStore>, keys: KeyManager) -> Self {
        Self {
            store,
            keys,
            state: GateState::Checking,
            record: None,
            password: Zeroizing::default(),
            confirmation: Zeroizing::default(),
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// The single "is a DEK available" flag for the rest of the app.
    pub fn is_unlocked(&self) -> bool {
        self.keys.is_unlocked()
    }

    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.password = Zeroizing::new(value.into());
    }

    pub fn set_confirmation(&mut self, value: impl Into<String>) {
        self.confirmation = Zeroizing::new(value.into());
    }

    pub fn has_pending_input(&self) -> bool {
        !self.password.is_empty() || !self.confirmation.is_empty()
    }

    fn apply(&mut self, event: GateEvent) {
        let previous = mem::replace(&mut self.state, GateState::Checking);
        self.state = previous.transition(event);
        debug!(?event, state = ?self.state, "vault gate transition");
    }

    fn clear_inputs(&mut self) {
        self.password.zeroize();
        self.confirmation.zeroize();
    }

    fn take_password(&mut self) -> Zeroizing<String> {
        let password = Zeroizing::new(mem::take(&mut *self.password));
        self.clear_inputs();
        password
    }

    /// Opens the gate. Skips straight to `Unlocked` when a DEK is already
    /// held; otherwise fetches the metadata.
    pub async fn open(&mut self) -> VaultResult<()> {
        self.apply(GateEvent::Opened {
            unlocked: self.keys.is_unlocked(),
        });
        if self.state == GateState::Unlocked {
            return Ok(());
        }
        self.check().await
    }

    /// Leaves `Error` by re-running the metadata check. No-op elsewhere.
    pub async fn retry(&mut self) -> VaultResult<()> {
        if !matches!(self.state, GateState::Error { .. }) {
            return Ok(());
        }
        self.apply(GateEvent::Retry);
        self.check().await
    }

    /// Closes the gate: clears the inputs and abandons any in-flight
    /// attempt so its result is never installed.
    pub fn dismiss(&mut self) {
        self.clear_inputs();
        self.keys.cancel_pending();
    }

    async fn check(&mut self) -> VaultResult<()> {
        self.clear_inputs();
        self.record = None;

        match self.store.fetch_meta().await {
            Ok(record) => {
                self.apply(GateEvent::MetadataLoaded {
                    configured: record.is_configured(),
                });
                self.record = Some(record);
                Ok(())
            }
            Err(MetaStoreError::NotAuthenticated) => {
                self.apply(GateEvent::MetadataFailed(GateFeedback::SignInRequired));
                Err(VaultError::NotAuthenticated)
            }
            Err(MetaStoreError::Unavailable(reason)) => {
                warn!("vault metadata fetch failed: {reason}");
                self.apply(GateEvent::MetadataFailed(GateFeedback::CheckFailed));
                Err(VaultError::MetadataFetchFailed(reason))
            }
        }
    }

    /// Submits the entered password for the current state.
    ///
    /// Input problems (empty password, confirmation mismatch) only set
    /// feedback and return `Ok`. Outcomes from the key manager or the
    /// store are returned as errors as well as reflected in the state.
    pub async fn submit(&mut self) -> VaultResult<()> {
        match self.state {
            GateState::Setup { .. } => self.submit_setup().await,
            GateState::Unlock { .. } => self.submit_unlock().await,
            _ => Ok(()),
        }
    }

    async fn submit_setup(&mut self) -> VaultResult<()> {
        if self.password.is_empty() {
            self.apply(GateEvent::Rejected(GateFeedback::PasswordRequired));
            return Ok(());
        }
        if *self.password != *self.confirmation {
            self.apply(GateEvent::Rejected(GateFeedback::PasswordMismatch));
            return Ok(());
        }

        let attempt = match self.keys.begin_attempt() {
            Ok(attempt) => attempt,
            Err(e) => {
                self.apply(GateEvent::Rejected(GateFeedback::AttemptInProgress));
                return Err(e);
            }
        };
        let password = self.take_password();
        let current = self.record.clone().unwrap_or_default();

        let keys = self.keys.clone();
        let prepared =
            tokio::task::spawn_blocking(move || keys.prepare_setup(&password, &current)).await;
        let pending = match flatten(prepared) {
            Ok(pending) => pending,
            Err(e) => {
                let feedback = match e {
                    VaultError::AlreadyConfigured => GateFeedback::AlreadyConfigured,
                    _ => GateFeedback::SetupFailed,
                };
                self.apply(GateEvent::Rejected(feedback));
                return Err(e);
            }
        };

        let record = pending.metadata().to_record();
        if let Err(e) = self.store.persist_meta(&record).await {
            // The vault stays unconfigured remotely; the DEK is dropped here.
            warn!("vault metadata persist failed: {e}");
            return Err(match e {
                MetaStoreError::NotAuthenticated => {
                    self.apply(GateEvent::Rejected(GateFeedback::SignInRequired));
                    VaultError::NotAuthenticated
                }
                MetaStoreError::Unavailable(reason) => {
                    self.apply(GateEvent::Rejected(GateFeedback::SaveFailed));
                    VaultError::MetadataPersistFailed(reason)
                }
            });
        }
        self.record = Some(record);

        if let Err(e) = self.keys.complete_setup(pending, attempt) {
            self.apply(GateEvent::Configured);
            return Err(e);
        }
        self.apply(GateEvent::Unlocked);
        Ok(())
    }

    async fn submit_unlock(&mut self) -> VaultResult<()> {
        if self.password.is_empty() {
            self.apply(GateEvent::Rejected(GateFeedback::PasswordRequired));
            return Ok(());
        }

        let attempt = match self.keys.begin_attempt() {
            Ok(attempt) => attempt,
            Err(e) => {
                self.apply(GateEvent::Rejected(GateFeedback::AttemptInProgress));
                return Err(e);
            }
        };
        let password = self.take_password();

        let record = match self.store.fetch_meta().await {
            Ok(record) => record,
            Err(MetaStoreError::NotAuthenticated) => {
                self.apply(GateEvent::Failed(GateFeedback::SignInRequired));
                return Err(VaultError::NotAuthenticated);
            }
            Err(MetaStoreError::Unavailable(reason)) => {
                warn!("vault metadata fetch failed: {reason}");
                self.apply(GateEvent::Failed(GateFeedback::OpenFailed));
                return Err(VaultError::MetadataFetchFailed(reason));
            }
        };
        let metadata = match record.decode() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("vault metadata unusable: {e}");
                self.apply(GateEvent::Failed(GateFeedback::OpenFailed));
                return Err(e);
            }
        };
        self.record = Some(record);

        let opened =
            tokio::task::spawn_blocking(move || open_wrapped_dek(&password, &metadata)).await;
        let dek = match flatten(opened) {
            Ok(dek) => dek,
            Err(VaultError::InvalidPassword) => {
                self.apply(GateEvent::Rejected(GateFeedback::WrongPassword));
                return Err(VaultError::InvalidPassword);
            }
            Err(e) => {
                self.apply(GateEvent::Failed(GateFeedback::OpenFailed));
                return Err(e);
            }
        };

        if let Err(e) = self.keys.finish_unlock(attempt, dek) {
            self.apply(GateEvent::Superseded);
            return Err(e);
        }
        self.apply(GateEvent::Unlocked);
        Ok(())
    }
}

fn flatten<T>(joined: Result<VaultResult<T>, JoinError>) -> VaultResult<T> {
    joined.unwrap_or_else(|e| Err(VaultError::Task(e.to_string())))
}
