//! Single-use confirmation tokens for destructive operations.
//!
//! A token binds a random value to a target name for a short time. Confirming
//! with the right target consumes it; confirming with the wrong target leaves
//! it in place so a typo does not burn the legitimate token.

use chrono::{DateTime, Utc};
use filegate_core::constants::{redact_token, CONFIRMATION_TOKEN_BYTES};
use filegate_core::AccessError;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clock::{Clock, SystemClock};

/// A token handed to the caller of a "request" operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationToken {
    pub token: String,
    pub target_name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Entry {
    target_name: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

pub struct ConfirmationTokenStore {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ConfirmationTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationTokenStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ConfirmationTokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Issue a fresh token for `target_name`.
    pub async fn issue(&self, target_name: &str) -> ConfirmationToken {
        let now = self.clock.now();
        let expires_at = self.expiry_from(now);

        let mut entries = self.entries.write().await;
        let token = loop {
            let candidate = generate_token();
            match entries.get(&candidate) {
                Some(existing) if !existing.is_expired_at(now) => {
                    tracing::warn!("Confirmation token collision, regenerating");
                }
                _ => break candidate,
            }
        };
        entries.insert(
            token.clone(),
            Entry {
                target_name: target_name.to_string(),
                expires_at,
            },
        );
        drop(entries);

        tracing::info!(
            token = %redact_token(&token),
            target = %target_name,
            expires_at = %expires_at,
            "Issued confirmation token"
        );

        ConfirmationToken {
            token,
            target_name: target_name.to_string(),
            expires_at,
        }
    }

    /// Consume `token` for `target_name`.
    ///
    /// - unknown token: `ConfirmationTokenNotFoundOrExpired`
    /// - expired token: removed, `ConfirmationTokenNotFoundOrExpired`
    /// - live token for another target: kept, `ConfirmationTargetMismatch`
    /// - live token for this target: removed, `Ok(())`
    pub async fn consume(&self, token: &str, target_name: &str) -> Result<(), AccessError> {
        if !self.entries.read().await.contains_key(token) {
            tracing::debug!(token = %redact_token(token), "Confirmation token not found");
            return Err(AccessError::ConfirmationTokenNotFoundOrExpired);
        }

        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        // Re-check under the write lock: a concurrent confirm may have won.
        let entry = match entries.get(token) {
            Some(entry) => entry,
            None => {
                tracing::debug!(token = %redact_token(token), "Confirmation token already consumed");
                return Err(AccessError::ConfirmationTokenNotFoundOrExpired);
            }
        };

        if entry.is_expired_at(now) {
            entries.remove(token);
            tracing::debug!(token = %redact_token(token), "Confirmation token expired");
            return Err(AccessError::ConfirmationTokenNotFoundOrExpired);
        }

        if entry.target_name != target_name {
            tracing::warn!(
                token = %redact_token(token),
                expected = %entry.target_name,
                presented = %target_name,
                "Confirmation token presented for another target"
            );
            return Err(AccessError::ConfirmationTargetMismatch);
        }

        entries.remove(token);
        tracing::info!(
            token = %redact_token(token),
            target = %target_name,
            "Confirmation token consumed"
        );
        Ok(())
    }

    pub async fn verify(&self, token: &str, target_name: &str) -> bool {
        self.consume(token, target_name).await.is_ok()
    }

    /// Remove every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let purged = before - entries.len();
        drop(entries);

        if purged > 0 {
            tracing::debug!(purged, "Purged expired confirmation tokens");
        }
        purged
    }

    /// Whether an entry is stored for `token`, expired or not.
    pub async fn contains(&self, token: &str) -> bool {
        self.entries.read().await.contains_key(token)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; CONFIRMATION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
