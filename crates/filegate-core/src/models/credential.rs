//! Access-key / secret-key credentials.

use std::fmt;

/// Identity used as HMAC key material when signing or verifying tokens.
///
/// Immutable after creation. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_key: String,
    secret_key: Vec<u8>,
}

impl Credential {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<Vec<u8>>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Registry entry for an access key: its secret and whether it may sign uploads.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub secret_key: Vec<u8>,
    pub enabled: bool,
}

impl CredentialRecord {
    pub fn new(secret_key: impl Into<Vec<u8>>, enabled: bool) -> Self {
        Self {
            secret_key: secret_key.into(),
            enabled,
        }
    }

    /// Pair this record with the access key it was looked up by.
    pub fn to_credential(&self, access_key: &str) -> Credential {
        Credential::new(access_key, self.secret_key.clone())
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("secret_key", &"<redacted>")
            .field("enabled", &self.enabled)
            .finish()
    }
}
