//! Helpers behind the `filegate` command-line tool.

use anyhow::Context;
use chrono::{DateTime, Utc};
use filegate_core::{Credential, GateConfig, UploadPolicy};
use serde::Serialize;

/// Pick the signing credential: flags first, then the configured one.
pub fn resolve_credential(
    access_key: Option<String>,
    secret_key: Option<String>,
    config: &GateConfig,
) -> anyhow::Result<Credential> {
    match (access_key, secret_key) {
        (Some(ak), Some(sk)) => Ok(Credential::new(ak, sk.into_bytes())),
        (None, None) => config.upload_credential().context(
            "No credential given. Pass --access-key and --secret-key or set UPLOAD_ACCESS_KEY and UPLOAD_SECRET_KEY",
        ),
        _ => anyhow::bail!("--access-key and --secret-key must be given together"),
    }
}

/// Options for a new upload policy, as given on the command line.
#[derive(Debug, Default, Clone)]
pub struct PolicyArgs {
    pub deadline: Option<u64>,
    /// Seconds from now; ignored when `deadline` is set.
    pub expires_in: Option<u64>,
    pub min_size: Option<i64>,
    pub max_size: Option<i64>,
    pub notify_url: Option<String>,
}

impl PolicyArgs {
    pub fn into_policy(self, now: DateTime<Utc>) -> UploadPolicy {
        let deadline = self.deadline.or_else(|| {
            self.expires_in
                .map(|secs| (now.timestamp().max(0) as u64).saturating_add(secs))
        });

        let mut policy = UploadPolicy::default().with_size_range(self.min_size, self.max_size);
        if let Some(deadline) = deadline {
            policy = policy.with_deadline(deadline);
        }
        if let Some(url) = self.notify_url {
            policy = policy.with_notify_url(url);
        }
        policy
    }
}

#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub access_key: String,
    pub token: String,
    pub policy: UploadPolicy,
}

#[derive(Debug, Serialize)]
pub struct InspectedToken {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<UploadPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_take_precedence_over_config() {
        let config = GateConfig {
            upload_access_key: Some("cfg".to_string()),
            upload_secret_key: Some("cfg-secret".to_string()),
            ..GateConfig::default()
        };

        let cred =
            resolve_credential(Some("k1".to_string()), Some("s1".to_string()), &config).unwrap();
        assert_eq!(cred.access_key(), "k1");

        let cred = resolve_credential(None, None, &config).unwrap();
        assert_eq!(cred.access_key(), "cfg");
    }

    #[test]
    fn half_given_credential_is_an_error() {
        let config = GateConfig::default();
        assert!(resolve_credential(Some("k1".to_string()), None, &config).is_err());
        assert!(resolve_credential(None, None, &config).is_err());
    }

    #[test]
    fn expires_in_is_relative_to_now() {
        let now = DateTime::from_timestamp(1_000, 0).unwrap();
        let policy = PolicyArgs {
            expires_in: Some(60),
            ..PolicyArgs::default()
        }
        .into_policy(now);
        assert_eq!(policy.deadline, Some(1_060));

        let policy = PolicyArgs {
            deadline: Some(5),
            expires_in: Some(60),
            ..PolicyArgs::default()
        }
        .into_policy(now);
        assert_eq!(policy.deadline, Some(5));
    }

    #[test]
    fn empty_args_give_empty_policy() {
        let policy = PolicyArgs::default().into_policy(Utc::now());
        assert_eq!(policy, UploadPolicy::default());
    }
}
