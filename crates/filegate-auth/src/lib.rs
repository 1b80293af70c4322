//! Filegate Auth
//!
//! Credential-based signing for third-party uploads:
//!
//! - [`CredentialSigner`]: HMAC-SHA1 signing under an access-key/secret-key pair.
//! - [`UploadPolicyToken`]: issue and redeem `accessKey:signature:policy` tokens.
//! - [`CredentialRegistry`]: lookup of secrets and enabled state by access key.
//! - [`verify_bearer`]: shared bearer-token check for tool endpoints.

pub mod bearer;
pub mod registry;
pub mod signer;
pub mod upload_token;

// Re-export commonly used types
pub use bearer::verify_bearer;
pub use registry::{CredentialRegistry, InMemoryCredentialRegistry};
pub use signer::{CredentialSigner, VerifyFailure};
pub use upload_token::UploadPolicyToken;
