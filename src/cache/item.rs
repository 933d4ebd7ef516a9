//! Cache Item Module
//!
//! Defines the record persisted per key by the file backend, together with
//! the policy that decides whether a record read back is still usable.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Item ==
/// A single persisted cache record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheItem {
    /// The key the record was written under
    pub key: String,
    /// The stored payload
    pub data: Value,
    /// Expiration timestamp (Unix seconds), 0 = never expires
    pub expiry: i64,
}

impl CacheItem {
    // == Constructor ==
    /// Creates a record whose expiry is `ttl_seconds` after `now`.
    ///
    /// # Arguments
    /// * `key` - The key being written
    /// * `data` - The payload
    /// * `ttl_seconds` - Normalized TTL, 0 = never expires
    /// * `now` - Current Unix timestamp in seconds
    pub fn new(key: impl Into<String>, data: Value, ttl_seconds: i64, now: i64) -> Self {
        Self {
            key: key.into(),
            data,
            expiry: compute_expiry(ttl_seconds, now),
        }
    }

    /// Returns true if the record has no expiry.
    pub fn never_expires(&self) -> bool {
        self.expiry == 0
    }

    // == Encoding ==
    /// Serializes the record for storage.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decodes a stored record.
    ///
    /// Anything that is not exactly a `{key, data, expiry}` object with an
    /// integer expiry yields `None`.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}

// == Expiry ==
/// Computes the absolute expiry for a TTL written at `now`.
///
/// A TTL of 0 maps to 0 (never expires). Any other TTL yields a timestamp of
/// at least 1, so a huge negative TTL cannot wrap around to "never expires".
pub fn compute_expiry(ttl_seconds: i64, now: i64) -> i64 {
    if ttl_seconds == 0 {
        0
    } else {
        now.saturating_add(ttl_seconds).max(1)
    }
}

// == Validity ==
/// Decides whether a record read back for `requested_key` may be served.
///
/// Checked in order: the stored key must match, an expiry of 0 never expires,
/// and an expiry earlier than `now` is stale. A record whose expiry is not an
/// integer never reaches this point because [`CacheItem::decode`] rejects it.
pub fn is_valid(requested_key: &str, item: &CacheItem, now: i64) -> bool {
    if item.key != requested_key {
        return false;
    }

    if item.never_expires() {
        return true;
    }

    item.expiry >= now
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_item_creation_no_ttl() {
        let item = CacheItem::new("key", json!("value"), 0, NOW);

        assert_eq!(item.key, "key");
        assert_eq!(item.data, json!("value"));
        assert!(item.never_expires());
    }

    #[test]
    fn test_item_creation_with_ttl() {
        let item = CacheItem::new("key", json!({"a": 1}), 60, NOW);
        assert_eq!(item.expiry, NOW + 60);
    }

    #[test]
    fn test_negative_ttl_never_becomes_zero() {
        assert_eq!(compute_expiry(-NOW, NOW), 1);
        assert_eq!(compute_expiry(i64::MIN, NOW), 1);
        assert_eq!(compute_expiry(-10, NOW), NOW - 10);
    }

    #[test]
    fn test_key_mismatch_is_invalid() {
        let item = CacheItem::new("key", json!("v"), 0, NOW);
        assert!(!is_valid("not_the_correct_key", &item, NOW));
        assert!(is_valid("key", &item, NOW));
    }

    #[test]
    fn test_never_expires_is_valid_forever() {
        let item = CacheItem::new("key", json!("v"), 0, NOW);
        assert!(is_valid("key", &item, i64::MAX));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let item = CacheItem::new("key", json!("v"), 10, NOW);

        assert!(is_valid("key", &item, NOW + 10), "Still valid at expiry second");
        assert!(!is_valid("key", &item, NOW + 11), "Stale after expiry second");
    }

    #[test]
    fn test_negative_ttl_is_already_expired() {
        let item = CacheItem::new("key", json!("v"), -1, NOW);
        assert!(!is_valid("key", &item, NOW));
    }

    #[test]
    fn test_encode_decode() {
        let item = CacheItem::new("key", json!(["x", 1, null]), 5, NOW);
        let bytes = item.encode().unwrap();
        assert_eq!(CacheItem::decode(&bytes), Some(item));
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        let cases: [&[u8]; 6] = [
            b"",
            b"not json",
            br#"["key", "data", 0]"#,
            br#"{"key": "key", "data": 1, "expiry": "IM NOT A NUMBER!"}"#,
            br#"{"key": "key", "data": 1, "expiry": 1.5}"#,
            br#"{"key": "key", "data": 1, "expiry": 0, "extra": true}"#,
        ];

        for bytes in cases {
            assert!(CacheItem::decode(bytes).is_none(), "{:?}", String::from_utf8_lossy(bytes));
        }
    }
}
