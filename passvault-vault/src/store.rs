//! Seam to the remote service that stores vault metadata.

use crate::metadata::VaultMetaRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a [`VaultMetaStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetaStoreError {
    /// The user's session with the remote service is gone (HTTP 403).
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("metadata store unavailable: {0}")]
    Unavailable(String),
}

/// Remote storage for the vault metadata record.
#[async_trait]
pub trait VaultMetaStore: Send + Sync {
    async fn fetch_meta(&self) -> Result<VaultMetaRecord, MetaStoreError>;

    async fn persist_meta(&self, record: &VaultMetaRecord) -> Result<(), MetaStoreError>;
}
