//! Shared constants for tokens and sandboxed paths.

use std::time::Duration;

/// Lifetime of a delete confirmation token.
pub const CONFIRMATION_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Period of the background sweep over abandoned confirmation tokens.
pub const CONFIRMATION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Random bytes per confirmation token (hex-encoded to 32 characters).
pub const CONFIRMATION_TOKEN_BYTES: usize = 16;

/// Number of characters of a confirmation token that may appear in logs.
pub const TOKEN_LOG_PREFIX_LEN: usize = 8;

/// Separator between the fields of an upload token.
pub const TOKEN_FIELD_SEPARATOR: char = ':';

/// Prefix expected in front of the shared bearer token.
pub const BEARER_PREFIX: &str = "Bearer ";

pub const DEFAULT_UPLOAD_DIR: &str = "./website/upload";
pub const DEFAULT_DOWNLOAD_DIR: &str = "./website/download";

/// Truncate a token for logging: first characters followed by `...`.
pub fn redact_token(token: &str) -> String {
    match token.char_indices().nth(TOKEN_LOG_PREFIX_LEN) {
        Some((idx, _)) => format!("{}...", &token[..idx]),
        None => format!("{}...", token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_token_keeps_prefix_only() {
        assert_eq!(
            redact_token("0123456789abcdef0123456789abcdef"),
            "01234567..."
        );
    }

    #[test]
    fn redact_token_short_input() {
        assert_eq!(redact_token("abc"), "abc...");
        assert_eq!(redact_token(""), "...");
    }
}
