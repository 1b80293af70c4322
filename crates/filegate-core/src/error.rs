//! Error types module
//!
//! This module provides the error taxonomy of the access subsystem. Every
//! verification path fails closed into one of the `AccessError` variants; none
//! of them is fatal to the process. Variants never carry secret key material.
//!
//! Errors self-describe how the request layer should present them through the
//! `ErrorMetadata` trait, so handlers do not need a match of their own.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a rejected token
    Debug,
    /// Warning level - for suspicious input like traversal attempts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "SIGNATURE_MISMATCH")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Unknown or disabled credential: {0}")]
    UnknownOrDisabledCredential(String),

    #[error("Token signature mismatch")]
    SignatureMismatch,

    #[error("Path traversal rejected: {0}")]
    PathTraversal(String),

    #[error("Path outside base directory: {0}")]
    PathOutsideBase(String),

    #[error("Symlink escapes base directory: {0}")]
    SymlinkEscape(String),

    #[error("Confirmation token not found or expired")]
    ConfirmationTokenNotFoundOrExpired,

    #[error("Confirmation token does not match the target")]
    ConfirmationTargetMismatch,

    #[error("Upload policy expired at {deadline}")]
    UploadPolicyExpired { deadline: u64 },

    #[error("Credential lookup failed: {0}")]
    CredentialLookup(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<io::Error> for AccessError {
    fn from(err: io::Error) -> Self {
        AccessError::Io(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn access_error_static_metadata(
    err: &AccessError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AccessError::MalformedToken(_) => (
            400,
            "MALFORMED_TOKEN",
            false,
            Some("Check the token format (accessKey:signature:policy)"),
            false,
            LogLevel::Debug,
        ),
        AccessError::UnknownOrDisabledCredential(_) => (
            401,
            "UNKNOWN_OR_DISABLED_CREDENTIAL",
            false,
            Some("Request a token for an enabled access key"),
            false,
            LogLevel::Debug,
        ),
        AccessError::SignatureMismatch => (
            401,
            "SIGNATURE_MISMATCH",
            false,
            Some("Request a new upload token"),
            false,
            LogLevel::Warn,
        ),
        AccessError::PathTraversal(_) => (
            400,
            "PATH_TRAVERSAL",
            false,
            Some("Use a path relative to the base directory without '..'"),
            false,
            LogLevel::Warn,
        ),
        AccessError::PathOutsideBase(_) => (
            400,
            "PATH_OUTSIDE_BASE",
            false,
            Some("Use a path inside the base directory"),
            false,
            LogLevel::Warn,
        ),
        AccessError::SymlinkEscape(_) => (
            403,
            "SYMLINK_ESCAPE",
            false,
            None,
            true,
            LogLevel::Warn,
        ),
        AccessError::ConfirmationTokenNotFoundOrExpired => (
            404,
            "CONFIRMATION_TOKEN_NOT_FOUND",
            false,
            Some("Request deletion again to obtain a new confirmation token"),
            false,
            LogLevel::Debug,
        ),
        AccessError::ConfirmationTargetMismatch => (
            400,
            "CONFIRMATION_TARGET_MISMATCH",
            false,
            Some("Confirm with the same filename used for the request"),
            false,
            LogLevel::Debug,
        ),
        AccessError::UploadPolicyExpired { .. } => (
            401,
            "UPLOAD_POLICY_EXPIRED",
            false,
            Some("Request a new upload token"),
            false,
            LogLevel::Debug,
        ),
        AccessError::CredentialLookup(_) => (
            500,
            "CREDENTIAL_LOOKUP_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AccessError::Io(_) => (
            500,
            "IO_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AccessError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AccessError::MalformedToken(_) => "MalformedToken",
            AccessError::UnknownOrDisabledCredential(_) => "UnknownOrDisabledCredential",
            AccessError::SignatureMismatch => "SignatureMismatch",
            AccessError::PathTraversal(_) => "PathTraversal",
            AccessError::PathOutsideBase(_) => "PathOutsideBase",
            AccessError::SymlinkEscape(_) => "SymlinkEscape",
            AccessError::ConfirmationTokenNotFoundOrExpired => "ConfirmationTokenNotFoundOrExpired",
            AccessError::ConfirmationTargetMismatch => "ConfirmationTargetMismatch",
            AccessError::UploadPolicyExpired { .. } => "UploadPolicyExpired",
            AccessError::CredentialLookup(_) => "CredentialLookup",
            AccessError::Io(_) => "Io",
        }
    }

    /// True for the rejections produced by path validation.
    pub fn is_path_rejection(&self) -> bool {
        matches!(
            self,
            AccessError::PathTraversal(_)
                | AccessError::PathOutsideBase(_)
                | AccessError::SymlinkEscape(_)
        )
    }
}

impl ErrorMetadata for AccessError {
    fn http_status_code(&self) -> u16 {
        access_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        access_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        access_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        access_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        access_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        access_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AccessError::MalformedToken(_) => "Invalid token format".to_string(),
            AccessError::UnknownOrDisabledCredential(_) => {
                "Access key is unknown or disabled".to_string()
            }
            AccessError::SignatureMismatch => "Invalid upload token".to_string(),
            AccessError::PathTraversal(_) => "Invalid path: path traversal detected".to_string(),
            AccessError::PathOutsideBase(_) => "Invalid path: outside base directory".to_string(),
            AccessError::SymlinkEscape(_) => "Access denied".to_string(),
            AccessError::ConfirmationTokenNotFoundOrExpired => {
                "Invalid or expired confirmation token".to_string()
            }
            AccessError::ConfirmationTargetMismatch => {
                "Confirmation token does not match the requested file".to_string()
            }
            AccessError::UploadPolicyExpired { .. } => "Upload token has expired".to_string(),
            AccessError::CredentialLookup(_) => "Failed to verify token".to_string(),
            AccessError::Io(_) => "Internal server error".to_string(),
        }
    }
}
