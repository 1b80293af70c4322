//! Filegate CLI: issue and inspect upload tokens, check paths against a base directory.
//!
//! Keys fall back to UPLOAD_ACCESS_KEY and UPLOAD_SECRET_KEY. Output is JSON.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use filegate_auth::{InMemoryCredentialRegistry, UploadPolicyToken};
use filegate_cli::{resolve_credential, InspectedToken, IssuedToken, PolicyArgs};
use filegate_core::{CredentialRecord, GateConfig};
use filegate_infra::{init_telemetry, shutdown_telemetry, TelemetryConfig};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filegate", about = "Filegate token and path tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a signed upload token
    IssueUploadToken {
        #[arg(long)]
        access_key: Option<String>,
        #[arg(long)]
        secret_key: Option<String>,
        /// Unix timestamp after which the token should be refused
        #[arg(long)]
        deadline: Option<u64>,
        /// Deadline as seconds from now
        #[arg(long, conflicts_with = "deadline")]
        expires_in: Option<u64>,
        /// Minimum file size in bytes
        #[arg(long)]
        min_size: Option<i64>,
        /// Maximum file size in bytes
        #[arg(long)]
        max_size: Option<i64>,
        /// URL to notify once the upload is stored
        #[arg(long)]
        notify_url: Option<String>,
    },
    /// Verify an upload token and print its policy
    InspectUploadToken {
        token: String,
        #[arg(long)]
        access_key: Option<String>,
        #[arg(long)]
        secret_key: Option<String>,
    },
    /// Resolve a path under a base directory, rejecting escapes
    ResolvePath {
        base: PathBuf,
        path: PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry(&TelemetryConfig::from_env("filegate").with_default_filter("warn"))
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    let result = run(cli).await;
    shutdown_telemetry().await;
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::IssueUploadToken {
            access_key,
            secret_key,
            deadline,
            expires_in,
            min_size,
            max_size,
            notify_url,
        } => {
            let config = GateConfig::from_env().context("Failed to load configuration")?;
            let credential = resolve_credential(access_key, secret_key, &config)?;

            let policy = PolicyArgs {
                deadline,
                expires_in,
                min_size,
                max_size,
                notify_url,
            }
            .into_policy(Utc::now());

            let token = UploadPolicyToken::issue(&policy, &credential)?;
            tracing::info!(
                access_key = %credential.access_key(),
                deadline = ?policy.effective_deadline(),
                "Issued upload token"
            );
            print_json(&IssuedToken {
                access_key: credential.access_key().to_string(),
                token,
                policy,
            })?;
        }
        Commands::InspectUploadToken {
            token,
            access_key,
            secret_key,
        } => {
            let config = GateConfig::from_env().context("Failed to load configuration")?;
            let credential = resolve_credential(access_key, secret_key, &config)?;

            let registry = InMemoryCredentialRegistry::new();
            registry
                .insert(
                    credential.access_key(),
                    CredentialRecord::new(credential.secret_key().to_vec(), true),
                )
                .await;

            let inspected = match UploadPolicyToken::redeem(&token, &registry).await {
                Ok(policy) => InspectedToken {
                    valid: true,
                    expired: Some(policy.is_expired_at(Utc::now())),
                    policy: Some(policy),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(error_type = e.error_type(), "Upload token rejected");
                    InspectedToken {
                        valid: false,
                        policy: None,
                        expired: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            let valid = inspected.valid;
            print_json(&inspected)?;
            if !valid {
                std::process::exit(1);
            }
        }
        Commands::ResolvePath { base, path } => {
            match filegate_storage::resolve(&base, &path) {
                Ok(resolved) => print_json(&serde_json::json!({
                    "allowed": true,
                    "path": resolved.to_string(),
                }))?,
                Err(e) => {
                    tracing::warn!(
                        base = %base.display(),
                        path = %path.display(),
                        error_type = e.error_type(),
                        "Path rejected"
                    );
                    print_json(&serde_json::json!({
                        "allowed": false,
                        "error_type": e.error_type(),
                        "error": e.to_string(),
                    }))?;
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
