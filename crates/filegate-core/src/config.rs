//! Configuration module
//!
//! This module loads the gate configuration: sandbox base directories,
//! confirmation-token lifetimes, the optional static upload credential and
//! the optional shared bearer token.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    CONFIRMATION_SWEEP_INTERVAL, CONFIRMATION_TOKEN_TTL, DEFAULT_DOWNLOAD_DIR, DEFAULT_UPLOAD_DIR,
    TOKEN_FIELD_SEPARATOR,
};
use crate::models::Credential;

#[derive(Clone)]
pub struct GateConfig {
    pub environment: String,
    pub upload_dir: PathBuf,
    pub download_dir: PathBuf,
    pub confirm_token_ttl: Duration,
    pub confirm_sweep_interval: Duration,
    /// Reject upload tokens whose deadline has passed. Off by default: the
    /// deadline is otherwise left to the upload handler.
    pub enforce_upload_deadline: bool,
    pub upload_access_key: Option<String>,
    pub upload_secret_key: Option<String>,
    pub api_bearer_token: Option<String>,
}

impl std::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateConfig")
            .field("environment", &self.environment)
            .field("upload_dir", &self.upload_dir)
            .field("download_dir", &self.download_dir)
            .field("confirm_token_ttl", &self.confirm_token_ttl)
            .field("confirm_sweep_interval", &self.confirm_sweep_interval)
            .field("enforce_upload_deadline", &self.enforce_upload_deadline)
            .field("upload_access_key", &self.upload_access_key)
            .field(
                "upload_secret_key",
                &self.upload_secret_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "api_bearer_token",
                &self.api_bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            confirm_token_ttl: CONFIRMATION_TOKEN_TTL,
            confirm_sweep_interval: CONFIRMATION_SWEEP_INTERVAL,
            enforce_upload_deadline: false,
            upload_access_key: None,
            upload_secret_key: None,
            api_bearer_token: None,
        }
    }
}

impl GateConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = non_empty("ENVIRONMENT")
            .or_else(|| non_empty("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let confirm_token_ttl = match non_empty("CONFIRM_TOKEN_TTL_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("CONFIRM_TOKEN_TTL_SECS must be a number of seconds")
            })?),
            None => CONFIRMATION_TOKEN_TTL,
        };

        let confirm_sweep_interval = match non_empty("CONFIRM_SWEEP_INTERVAL_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("CONFIRM_SWEEP_INTERVAL_SECS must be a number of seconds")
            })?),
            None => CONFIRMATION_SWEEP_INTERVAL,
        };

        let enforce_upload_deadline = non_empty("UPLOAD_TOKEN_ENFORCE_DEADLINE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let config = GateConfig {
            environment,
            upload_dir: non_empty("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            download_dir: non_empty("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR)),
            confirm_token_ttl,
            confirm_sweep_interval,
            enforce_upload_deadline,
            upload_access_key: non_empty("UPLOAD_ACCESS_KEY"),
            upload_secret_key: non_empty("UPLOAD_SECRET_KEY"),
            api_bearer_token: non_empty("API_BEARER_TOKEN"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.confirm_token_ttl.is_zero() {
            return Err(anyhow::anyhow!(
                "CONFIRM_TOKEN_TTL_SECS must be greater than zero"
            ));
        }

        if self.confirm_sweep_interval.is_zero() {
            return Err(anyhow::anyhow!(
                "CONFIRM_SWEEP_INTERVAL_SECS must be greater than zero"
            ));
        }

        match (&self.upload_access_key, &self.upload_secret_key) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(anyhow::anyhow!(
                    "UPLOAD_ACCESS_KEY and UPLOAD_SECRET_KEY must be set together"
                ));
            }
            (Some(ak), Some(_)) if ak.contains(TOKEN_FIELD_SEPARATOR) => {
                return Err(anyhow::anyhow!("UPLOAD_ACCESS_KEY must not contain ':'"));
            }
            _ => {}
        }

        if self.is_production() && self.api_bearer_token.is_none() {
            return Err(anyhow::anyhow!(
                "API_BEARER_TOKEN must be set in production"
            ));
        }

        Ok(())
    }

    /// The statically configured upload credential, if any.
    pub fn upload_credential(&self) -> Option<Credential> {
        match (&self.upload_access_key, &self.upload_secret_key) {
            (Some(ak), Some(sk)) => Some(Credential::new(ak.clone(), sk.as_bytes().to_vec())),
            _ => None,
        }
    }
}
