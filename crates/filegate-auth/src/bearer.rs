//! Shared bearer-token check for tool endpoints.

use filegate_core::constants::BEARER_PREFIX;
use subtle::ConstantTimeEq;

/// Check an `Authorization` header against the configured bearer token.
///
/// With no token configured the endpoint is open. Otherwise the header must be
/// exactly `Bearer <token>`.
pub fn verify_bearer(authorization: Option<&str>, expected_token: Option<&str>) -> bool {
    let Some(expected_token) = expected_token else {
        return true;
    };

    let Some(header) = authorization else {
        tracing::warn!("Missing Authorization header");
        return false;
    };

    let expected = format!("{}{}", BEARER_PREFIX, expected_token);
    let matches: bool = expected.as_bytes().ct_eq(header.as_bytes()).into();
    if !matches {
        tracing::warn!("Invalid Authorization header");
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_when_not_configured() {
        assert!(verify_bearer(None, None));
        assert!(verify_bearer(Some("Bearer whatever"), None));
    }

    #[test]
    fn requires_exact_header() {
        assert!(verify_bearer(Some("Bearer s3cret"), Some("s3cret")));
        assert!(!verify_bearer(Some("bearer s3cret"), Some("s3cret")));
        assert!(!verify_bearer(Some("s3cret"), Some("s3cret")));
        assert!(!verify_bearer(Some("Bearer s3cret2"), Some("s3cret")));
        assert!(!verify_bearer(None, Some("s3cret")));
    }
}
