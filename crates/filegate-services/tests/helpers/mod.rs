#![allow(dead_code)]

use chrono::DateTime;
use filegate_core::constants::CONFIRMATION_TOKEN_TTL;
use filegate_core::{Credential, CredentialRecord};
use filegate_services::{
    AccessGate, ConfirmationTokenStore, InMemoryCredentialRegistry, ManualClock,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const ACCESS_KEY: &str = "k1";
pub const SECRET_KEY: &str = "s1";

/// A gate wired to a virtual clock, an in-memory registry holding `k1/s1`
/// and a scratch download directory.
pub struct TestGate {
    pub gate: AccessGate,
    pub store: Arc<ConfirmationTokenStore>,
    pub registry: Arc<InMemoryCredentialRegistry>,
    pub clock: Arc<ManualClock>,
    pub sandbox: TempDir,
}

impl TestGate {
    pub fn base_dir(&self) -> &Path {
        self.sandbox.path()
    }

    pub fn credential(&self) -> Credential {
        Credential::new(ACCESS_KEY, SECRET_KEY)
    }

    /// Create a file under the sandbox, with parent directories.
    pub fn create_file(&self, relative: &str, contents: &str) {
        let path = self.sandbox.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}

pub async fn setup_gate() -> TestGate {
    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    ));
    let store = Arc::new(ConfirmationTokenStore::with_clock(
        CONFIRMATION_TOKEN_TTL,
        clock.clone(),
    ));

    let registry = Arc::new(InMemoryCredentialRegistry::new());
    registry
        .insert(ACCESS_KEY, CredentialRecord::new(SECRET_KEY, true))
        .await;

    let gate = AccessGate::new(store.clone(), registry.clone());
    let sandbox = tempfile::tempdir().expect("Failed to create sandbox directory");

    TestGate {
        gate,
        store,
        registry,
        clock,
        sandbox,
    }
}
