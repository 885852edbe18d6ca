//! HTTP client for the vault REST API.
//!
//! Every endpoint shares one status policy: 200 is success, 403 means the
//! sign-in session is gone ([`CloudError::NotAuthenticated`]), anything
//! else is [`CloudError::Api`].

use crate::config::ApiConfig;
use crate::error::{CloudError, CloudResult};
use crate::types::{EntryRecord, EntryUpsert};
use async_trait::async_trait;
use passvault_vault::{MetaStoreError, VaultMetaRecord, VaultMetaStore};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// HTTP client for the vault API.
///
/// Cloning shares the connection pool and the session token.
#[derive(Clone)]
pub struct VaultApiClient {
    client: Client,
    config: ApiConfig,
    /// Bearer token from the sign-in layer. Without one, requests rely on
    /// whatever the server accepts (e.g. a cookie set elsewhere).
    session_token: Arc<RwLock<Option<String>>>,
}

impl VaultApiClient {
    pub fn new(config: ApiConfig) -> CloudResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            session_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn set_session_token(&self, token: impl Into<String>) {
        *self.session_token.write().await = Some(token.into());
    }

    pub async fn clear_session(&self) {
        *self.session_token.write().await = None;
    }

    pub async fn has_session(&self) -> bool {
        self.session_token.read().await.is_some()
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.config.url(path));
        match self.session_token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends `builder` and applies the status policy.
    async fn send(&self, builder: RequestBuilder, what: &str) -> CloudResult<Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        debug!(%status, "{what}");

        match status {
            StatusCode::OK => Ok(resp),
            StatusCode::FORBIDDEN => {
                warn!("403 on {what}, session expired");
                Err(CloudError::NotAuthenticated)
            }
            _ => Err(CloudError::Api(format!("{what}: {status}"))),
        }
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> CloudResult<T> {
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    // ── Metadata ──

    pub async fn fetch_meta(&self) -> CloudResult<VaultMetaRecord> {
        let req = self.request(Method::GET, "/vault/entries/meta").await;
        let resp = self.send(req, "GET /vault/entries/meta").await?;
        Self::read_json(resp).await
    }

    pub async fn save_meta(&self, record: &VaultMetaRecord) -> CloudResult<()> {
        let req = self
            .request(Method::POST, "/vault/entries/meta")
            .await
            .json(record);
        self.send(req, "POST /vault/entries/meta").await?;
        Ok(())
    }

    // ── Entries ──

    pub async fn list_entries(&self) -> CloudResult<Vec<EntryRecord>> {
        let req = self.request(Method::GET, "/vault/entries/all").await;
        let resp = self.send(req, "GET /vault/entries/all").await?;
        Self::read_json(resp).await
    }

    pub async fn list_category(&self, category: &str) -> CloudResult<Vec<EntryRecord>> {
        let req = self
            .request(Method::GET, "/vault/entries")
            .await
            .query(&[("categoryName", category)]);
        let resp = self.send(req, "GET /vault/entries").await?;
        Self::read_json(resp).await
    }

    pub async fn create_entry(&self, entry: &EntryUpsert) -> CloudResult<()> {
        let req = self
            .request(Method::POST, "/vault/entries/create")
            .await
            .json(entry);
        self.send(req, "POST /vault/entries/create").await?;
        Ok(())
    }

    pub async fn update_entry(&self, id: &str, entry: &EntryUpsert) -> CloudResult<()> {
        let req = self
            .request(Method::PATCH, &format!("/vault/entries/update/{id}"))
            .await
            .json(entry);
        self.send(req, "PATCH /vault/entries/update").await?;
        Ok(())
    }

    pub async fn delete_entry(&self, id: &str) -> CloudResult<()> {
        let req = self
            .request(Method::DELETE, &format!("/vault/entries/{id}"))
            .await;
        self.send(req, "DELETE /vault/entries").await?;
        Ok(())
    }
}

#[async_trait]
impl VaultMetaStore for VaultApiClient {
    async fn fetch_meta(&self) -> Result<VaultMetaRecord, MetaStoreError> {
        VaultApiClient::fetch_meta(self).await.map_err(into_store_error)
    }

    async fn persist_meta(&self, record: &VaultMetaRecord) -> Result<(), MetaStoreError> {
        self.save_meta(record).await.map_err(into_store_error)
    }
}

fn into_store_error(err: CloudError) -> MetaStoreError {
    match err {
        CloudError::NotAuthenticated => MetaStoreError::NotAuthenticated,
        other => MetaStoreError::Unavailable(other.to_string()),
    }
}
