//! HMAC-SHA1 signing under an access-key/secret-key pair.
//!
//! Plain signature: `accessKey:base64url_nopad(HMAC-SHA1(secretKey, data))`.
//! Upload token: `accessKey:signature:base64(payload)`, where the signed
//! material is the padded base64url text of the payload and the embedded
//! payload uses the standard alphabet.

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use filegate_core::constants::TOKEN_FIELD_SEPARATOR;
use filegate_core::{AccessError, Credential};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Why an upload token failed verification. Meant for logs, not for clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    /// Not exactly three `:`-separated fields.
    Malformed,
    AccessKeyMismatch,
    /// The embedded payload is not valid base64.
    PayloadDecode,
    SignatureMismatch,
}

impl VerifyFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            VerifyFailure::Malformed => "malformed_token",
            VerifyFailure::AccessKeyMismatch => "access_key_mismatch",
            VerifyFailure::PayloadDecode => "payload_decode_failed",
            VerifyFailure::SignatureMismatch => "signature_mismatch",
        }
    }
}

impl From<VerifyFailure> for AccessError {
    fn from(failure: VerifyFailure) -> Self {
        match failure {
            VerifyFailure::Malformed => {
                AccessError::MalformedToken("expected accessKey:signature:policy".to_string())
            }
            VerifyFailure::AccessKeyMismatch => {
                AccessError::UnknownOrDisabledCredential("access key mismatch".to_string())
            }
            VerifyFailure::PayloadDecode => {
                AccessError::MalformedToken("policy is not valid base64".to_string())
            }
            VerifyFailure::SignatureMismatch => AccessError::SignatureMismatch,
        }
    }
}

/// Signs and verifies tokens for one credential. Stateless apart from the key.
#[derive(Debug, Clone)]
pub struct CredentialSigner {
    credential: Credential,
}

impl CredentialSigner {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn access_key(&self) -> &str {
        self.credential.access_key()
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha1::new_from_slice(self.credential.secret_key())
            .expect("HMAC accepts any key size");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    /// Sign arbitrary data, e.g. a private download URL.
    pub fn sign(&self, data: &[u8]) -> String {
        let signature = URL_SAFE_NO_PAD.encode(self.digest(data));
        format!(
            "{}{}{}",
            self.credential.access_key(),
            TOKEN_FIELD_SEPARATOR,
            signature
        )
    }

    /// Sign a payload and embed it, producing an upload token.
    pub fn sign_with_data(&self, payload: &[u8]) -> String {
        let encoded_for_signing = URL_SAFE.encode(payload);
        let signed = self.sign(encoded_for_signing.as_bytes());
        format!(
            "{}{}{}",
            signed,
            TOKEN_FIELD_SEPARATOR,
            STANDARD.encode(payload)
        )
    }

    /// Verify a token produced by [`sign`](Self::sign) for `data`.
    pub fn verify_signature(&self, data: &[u8], token: &str) -> bool {
        constant_time_eq(&self.sign(data), token)
    }

    /// Verify an upload token and return the embedded payload bytes.
    ///
    /// The whole token is recomputed from the embedded payload and compared
    /// to the presented string in constant time.
    pub fn check_upload_token(&self, token: &str) -> Result<Vec<u8>, VerifyFailure> {
        let result = self.check_upload_token_inner(token);

        if let Err(failure) = &result {
            tracing::debug!(
                access_key = %self.credential.access_key(),
                reason = failure.reason(),
                "Upload token verification failed"
            );
        }

        result
    }

    fn check_upload_token_inner(&self, token: &str) -> Result<Vec<u8>, VerifyFailure> {
        let parts: Vec<&str> = token.split(TOKEN_FIELD_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(VerifyFailure::Malformed);
        }

        if parts[0] != self.credential.access_key() {
            return Err(VerifyFailure::AccessKeyMismatch);
        }

        let payload = STANDARD
            .decode(parts[2])
            .map_err(|_| VerifyFailure::PayloadDecode)?;

        let expected = self.sign_with_data(&payload);
        if !constant_time_eq(&expected, token) {
            return Err(VerifyFailure::SignatureMismatch);
        }

        Ok(payload)
    }

    pub fn verify_upload_token(&self, token: &str) -> bool {
        self.check_upload_token(token).is_ok()
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
