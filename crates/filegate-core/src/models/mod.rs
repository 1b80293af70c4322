pub mod credential;
pub mod upload_policy;

pub use credential::{Credential, CredentialRecord};
pub use upload_policy::{PolicyViolation, UploadPolicy};
