//! Entry points for the request-handling layer.
//!
//! `AccessGate` composes the token and path primitives in the order each
//! operation needs them. Its only state is shared handles; the confirmation
//! store is the one piece of mutable state behind it.

use filegate_auth::{
    verify_bearer, CredentialRegistry, InMemoryCredentialRegistry, UploadPolicyToken,
};
use filegate_core::{AccessError, GateConfig, PolicyViolation, UploadPolicy};
use filegate_storage::{resolve, validate_upload_filename, ResolvedPath};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::confirmation::{ConfirmationToken, ConfirmationTokenStore};
use crate::sweeper::ConfirmationSweeper;

#[derive(Clone)]
pub struct AccessGate {
    store: Arc<ConfirmationTokenStore>,
    registry: Arc<dyn CredentialRegistry>,
    enforce_upload_deadline: bool,
    api_bearer_token: Option<String>,
}

impl AccessGate {
    pub fn new(store: Arc<ConfirmationTokenStore>, registry: Arc<dyn CredentialRegistry>) -> Self {
        Self {
            store,
            registry,
            enforce_upload_deadline: false,
            api_bearer_token: None,
        }
    }

    /// Reject upload tokens whose deadline has passed.
    pub fn with_deadline_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_upload_deadline = enforce;
        self
    }

    /// Require `Authorization: Bearer <token>` on tool calls.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.api_bearer_token = token;
        self
    }

    /// Gate backed by an in-memory registry seeded from the configured credential.
    pub fn from_config(config: &GateConfig) -> Self {
        let store = Arc::new(ConfirmationTokenStore::new(config.confirm_token_ttl));
        let registry = Arc::new(InMemoryCredentialRegistry::from_config(config));
        Self::new(store, registry)
            .with_deadline_enforcement(config.enforce_upload_deadline)
            .with_bearer_token(config.api_bearer_token.clone())
    }

    pub fn store(&self) -> &Arc<ConfirmationTokenStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<dyn CredentialRegistry> {
        &self.registry
    }

    /// Start purging expired confirmation tokens every `period`.
    pub fn start_sweeper(&self, period: Duration) -> ConfirmationSweeper {
        ConfirmationSweeper::start(self.store.clone(), period)
    }

    /// Authenticate an upload token and return its policy.
    ///
    /// Size bounds are left to the caller. The deadline is checked here only
    /// when enforcement is enabled.
    #[tracing::instrument(skip(self, token))]
    pub async fn authorize_upload(&self, token: &str) -> Result<UploadPolicy, AccessError> {
        let policy = UploadPolicyToken::redeem(token, self.registry.as_ref()).await?;

        if self.enforce_upload_deadline {
            let now = self.store.now().timestamp().max(0) as u64;
            if let Err(PolicyViolation::Expired { deadline }) = policy.check_deadline(now) {
                tracing::info!(deadline, now, "Upload token past its deadline");
                return Err(AccessError::UploadPolicyExpired { deadline });
            }
        }

        Ok(policy)
    }

    /// Check the `Authorization` header of a tool call. Open when no bearer
    /// token is configured.
    pub fn authorize_tool_call(&self, authorization: Option<&str>) -> bool {
        verify_bearer(authorization, self.api_bearer_token.as_deref())
    }

    /// Resolve where an uploaded file named `filename` would be written.
    pub fn resolve_upload_target(
        &self,
        base_dir: impl AsRef<Path>,
        filename: &str,
    ) -> Result<ResolvedPath, AccessError> {
        let filename = validate_upload_filename(filename)?;
        resolve(base_dir, filename)
    }

    /// Check `name` under `base_dir` and issue a confirmation token for it.
    pub async fn request_delete(
        &self,
        base_dir: impl AsRef<Path>,
        name: &str,
    ) -> Result<ConfirmationToken, AccessError> {
        resolve(base_dir.as_ref(), name)?;
        Ok(self.store.issue(name).await)
    }

    /// Consume the confirmation token, then resolve `name` under `base_dir`.
    ///
    /// The token is checked first so path rejections reveal nothing about
    /// which tokens are live. A consumed token stays consumed even if the path is
    /// rejected or the deletion itself fails later.
    pub async fn confirm_delete(
        &self,
        base_dir: impl AsRef<Path>,
        name: &str,
        token: &str,
    ) -> Result<ResolvedPath, AccessError> {
        self.store.consume(token, name).await?;
        resolve(base_dir.as_ref(), name)
    }

    pub fn resolve_safe_path(
        &self,
        base_dir: impl AsRef<Path>,
        path: impl AsRef<Path>,
    ) -> Result<ResolvedPath, AccessError> {
        resolve(base_dir, path)
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("store", &self.store)
            .field("enforce_upload_deadline", &self.enforce_upload_deadline)
            .field(
                "api_bearer_token",
                &self.api_bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .finish_non_exhaustive()
    }
}
