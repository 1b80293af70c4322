//! Upload policy carried inside a signed upload token.
//!
//! The policy is serialized once with a fixed field order and those exact
//! bytes are embedded in the token. Decoding a token yields the policy back,
//! but nothing here enforces it implicitly: the size and deadline helpers are
//! meant to be called by the upload handler after the token is authenticated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Constraints an upload token grants its holder.
///
/// JSON field names are part of the wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Unix timestamp (seconds) after which the token should no longer be honored.
    /// `None` or `0` means no deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,

    /// Minimum accepted file size in bytes.
    #[serde(rename = "fsizeMin", default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i64>,

    /// Maximum accepted file size in bytes. Non-positive values mean unlimited.
    #[serde(rename = "fsizeLimit", default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i64>,

    /// URL notified once the upload has been persisted.
    #[serde(
        rename = "persistentNotifyUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub notify_url: Option<String>,
}

/// Reason an upload falls outside its policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("file size {size} is below the minimum of {min} bytes")]
    TooSmall { size: u64, min: i64 },

    #[error("file size {size} exceeds the limit of {max} bytes")]
    TooLarge { size: u64, max: i64 },

    #[error("upload policy expired at {deadline}")]
    Expired { deadline: u64 },
}

impl PolicyViolation {
    /// HTTP status an upload endpoint should answer with.
    pub fn http_status_code(&self) -> u16 {
        match self {
            PolicyViolation::TooSmall { .. } => 403,
            PolicyViolation::TooLarge { .. } => 413,
            PolicyViolation::Expired { .. } => 401,
        }
    }
}

impl UploadPolicy {
    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_size_range(mut self, min_size: Option<i64>, max_size: Option<i64>) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn with_notify_url(mut self, url: impl Into<String>) -> Self {
        self.notify_url = Some(url.into());
        self
    }

    /// Serialize to the canonical JSON bytes that get signed.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a policy from the bytes embedded in a token.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// The effective deadline, ignoring the `0` sentinel.
    pub fn effective_deadline(&self) -> Option<u64> {
        self.deadline.filter(|d| *d > 0)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.check_deadline(now.timestamp().max(0) as u64).is_err()
    }

    /// Check the deadline against `now_epoch_secs`.
    pub fn check_deadline(&self, now_epoch_secs: u64) -> Result<(), PolicyViolation> {
        match self.effective_deadline() {
            Some(deadline) if now_epoch_secs > deadline => {
                Err(PolicyViolation::Expired { deadline })
            }
            _ => Ok(()),
        }
    }

    /// Check an upload size against the policy's bounds.
    pub fn check_size(&self, size: u64) -> Result<(), PolicyViolation> {
        let size_i128 = i128::from(size);

        if let Some(min) = self.min_size {
            if size_i128 < i128::from(min) {
                return Err(PolicyViolation::TooSmall { size, min });
            }
        }

        if let Some(max) = self.max_size.filter(|m| *m > 0) {
            if size_i128 > i128::from(max) {
                return Err(PolicyViolation::TooLarge { size, max });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_bytes_use_stable_field_order() {
        let policy = UploadPolicy::default()
            .with_deadline(1_700_000_000)
            .with_size_range(Some(1), Some(1024))
            .with_notify_url("https://example.com/hook");

        let json = String::from_utf8(policy.to_canonical_bytes().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"deadline":1700000000,"fsizeMin":1,"fsizeLimit":1024,"persistentNotifyUrl":"https://example.com/hook"}"#
        );
    }

    #[test]
    fn unset_fields_are_omitted() {
        let policy = UploadPolicy::default().with_deadline(0);
        let json = String::from_utf8(policy.to_canonical_bytes().unwrap()).unwrap();
        assert_eq!(json, r#"{"deadline":0}"#);

        let empty = UploadPolicy::default();
        assert_eq!(empty.to_canonical_bytes().unwrap(), b"{}");
    }

    #[test]
    fn decode_accepts_wire_field_names() {
        let policy =
            UploadPolicy::from_bytes(br#"{"deadline":10,"fsizeLimit":5,"fsizeMin":2}"#).unwrap();
        assert_eq!(policy.deadline, Some(10));
        assert_eq!(policy.min_size, Some(2));
        assert_eq!(policy.max_size, Some(5));
        assert_eq!(policy.notify_url, None);
    }

    #[test]
    fn check_size_bounds() {
        let policy = UploadPolicy::default().with_size_range(Some(10), Some(100));
        assert!(policy.check_size(10).is_ok());
        assert!(policy.check_size(100).is_ok());

        let too_small = policy.check_size(9).unwrap_err();
        assert_eq!(too_small, PolicyViolation::TooSmall { size: 9, min: 10 });
        assert_eq!(too_small.http_status_code(), 403);

        let too_large = policy.check_size(101).unwrap_err();
        assert_eq!(too_large, PolicyViolation::TooLarge { size: 101, max: 100 });
        assert_eq!(too_large.http_status_code(), 413);
    }

    #[test]
    fn non_positive_limit_means_unlimited() {
        let policy = UploadPolicy::default().with_size_range(None, Some(0));
        assert!(policy.check_size(u64::MAX).is_ok());
    }

    #[test]
    fn zero_deadline_never_expires() {
        let policy = UploadPolicy::default().with_deadline(0);
        assert!(policy.check_deadline(u64::MAX).is_ok());
        assert_eq!(policy.effective_deadline(), None);
    }

    #[test]
    fn deadline_in_the_past_is_reported() {
        let policy = UploadPolicy::default().with_deadline(100);
        assert!(policy.check_deadline(100).is_ok());
        assert_eq!(
            policy.check_deadline(101),
            Err(PolicyViolation::Expired { deadline: 100 })
        );

        let now = DateTime::from_timestamp(101, 0).unwrap();
        assert!(policy.is_expired_at(now));
    }
}
