//! Upload policy tokens.
//!
//! `issue` signs the canonical policy bytes; `redeem` authenticates a token
//! against the registry and returns the policy decoded from the embedded
//! bytes. Redeeming is decode-and-authenticate only: deadline and size bounds
//! are left to the caller (see [`UploadPolicy::check_size`] and
//! [`UploadPolicy::check_deadline`]).

use crate::registry::CredentialRegistry;
use crate::signer::CredentialSigner;
use filegate_core::constants::TOKEN_FIELD_SEPARATOR;
use filegate_core::{AccessError, Credential, UploadPolicy};

pub struct UploadPolicyToken;

impl UploadPolicyToken {
    /// Issue an upload token for `policy` signed by `credential`.
    pub fn issue(policy: &UploadPolicy, credential: &Credential) -> Result<String, AccessError> {
        let policy_bytes = policy.to_canonical_bytes().map_err(|e| {
            AccessError::MalformedToken(format!("failed to encode upload policy: {}", e))
        })?;

        let token = CredentialSigner::new(credential.clone()).sign_with_data(&policy_bytes);

        tracing::debug!(
            access_key = %credential.access_key(),
            deadline = ?policy.deadline,
            "Issued upload token"
        );

        Ok(token)
    }

    /// Authenticate `token` and return its policy.
    ///
    /// Unknown and disabled access keys are rejected alike.
    pub async fn redeem<R>(token: &str, registry: &R) -> Result<UploadPolicy, AccessError>
    where
        R: CredentialRegistry + ?Sized,
    {
        let access_key = Self::access_key_of(token)?;

        let record = match registry.lookup(access_key).await {
            Ok(Some(record)) if record.enabled => record,
            Ok(Some(_)) => {
                tracing::debug!(access_key = %access_key, "Access key is disabled");
                return Err(AccessError::UnknownOrDisabledCredential(
                    access_key.to_string(),
                ));
            }
            Ok(None) => {
                tracing::debug!(access_key = %access_key, "Access key not found");
                return Err(AccessError::UnknownOrDisabledCredential(
                    access_key.to_string(),
                ));
            }
            Err(e) => {
                tracing::error!(access_key = %access_key, error = %e, "Credential lookup failed");
                return Err(e);
            }
        };

        let signer = CredentialSigner::new(record.to_credential(access_key));
        let policy_bytes = signer.check_upload_token(token)?;

        UploadPolicy::from_bytes(&policy_bytes)
            .map_err(|e| AccessError::MalformedToken(format!("invalid upload policy: {}", e)))
    }

    /// The access key of a well-formed token.
    pub fn access_key_of(token: &str) -> Result<&str, AccessError> {
        let mut parts = token.split(TOKEN_FIELD_SEPARATOR);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(access_key), Some(_), Some(_), None) => Ok(access_key),
            _ => Err(AccessError::MalformedToken(
                "expected accessKey:signature:policy".to_string(),
            )),
        }
    }
}
