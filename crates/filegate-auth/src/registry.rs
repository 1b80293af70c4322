//! Credential registry: secret and enabled state per access key.
//!
//! Persistence lives behind the [`CredentialRegistry`] trait. The in-memory
//! implementation serves tests and the statically configured credential.

use async_trait::async_trait;
use filegate_core::{AccessError, CredentialRecord, GateConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait CredentialRegistry: Send + Sync {
    /// Look up the record for `access_key`.
    ///
    /// `Ok(None)` when the key is unknown. Backend failures are errors; callers
    /// treat them as rejections.
    async fn lookup(&self, access_key: &str) -> Result<Option<CredentialRecord>, AccessError>;
}

#[async_trait]
impl<T: CredentialRegistry + ?Sized> CredentialRegistry for Arc<T> {
    async fn lookup(&self, access_key: &str) -> Result<Option<CredentialRecord>, AccessError> {
        (**self).lookup(access_key).await
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialRegistry {
    records: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the credential from `UPLOAD_ACCESS_KEY`/`UPLOAD_SECRET_KEY`.
    pub fn from_config(config: &GateConfig) -> Self {
        let mut records = HashMap::new();
        if let Some(credential) = config.upload_credential() {
            records.insert(
                credential.access_key().to_string(),
                CredentialRecord::new(credential.secret_key().to_vec(), true),
            );
        }
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn insert(&self, access_key: impl Into<String>, record: CredentialRecord) {
        let access_key = access_key.into();
        tracing::info!(access_key = %access_key, enabled = record.enabled, "Registered credential");
        self.records.write().await.insert(access_key, record);
    }

    /// Enable or disable an access key. Returns false if the key is unknown.
    pub async fn set_enabled(&self, access_key: &str, enabled: bool) -> bool {
        match self.records.write().await.get_mut(access_key) {
            Some(record) => {
                record.enabled = enabled;
                tracing::info!(access_key = %access_key, enabled, "Updated credential state");
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, access_key: &str) -> Option<CredentialRecord> {
        self.records.write().await.remove(access_key)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialRegistry for InMemoryCredentialRegistry {
    async fn lookup(&self, access_key: &str) -> Result<Option<CredentialRecord>, AccessError> {
        Ok(self.records.read().await.get(access_key).cloned())
    }
}
