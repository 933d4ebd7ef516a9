//! Ephemeral Cache Module
//!
//! Stores raw values in an [`EphemeralStore`], which enforces expiry itself.
//! Keys are namespaced by an optional group so that several caches can share
//! one store.

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::batch;
use crate::cache::ttl::{self, Ttl};
use crate::cache::{key, Cache};
use crate::error::Result;
use crate::storage::EphemeralStore;

/// Separator between a group name and a key.
///
/// It can never appear in a valid key, so `a` + key `b_c` and `a_b` + key `c`
/// map to different store keys.
pub const GROUP_SEPARATOR: &str = ":";

// == Ephemeral Cache ==
/// Cache backend that delegates storage and expiry to an [`EphemeralStore`].
#[derive(Debug, Clone)]
pub struct EphemeralCache<S> {
    store: S,
    /// `group + GROUP_SEPARATOR`, or empty when ungrouped
    prefix: String,
}

impl<S: EphemeralStore> EphemeralCache<S> {
    // == Constructor ==
    /// Creates an ungrouped cache over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            prefix: String::new(),
        }
    }

    /// Creates a cache whose keys live under `group`.
    ///
    /// An empty group behaves like [`EphemeralCache::new`].
    pub fn with_group(store: S, group: impl Into<String>) -> Self {
        let group = group.into();
        let prefix = if group.is_empty() {
            String::new()
        } else {
            format!("{}{}", group, GROUP_SEPARATOR)
        };

        Self { store, prefix }
    }

    /// Returns the prefix applied to every key.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Lists the store keys this cache could have written.
    ///
    /// A plain prefix match is not enough: an ungrouped cache would otherwise
    /// also see every grouped key.
    fn own_keys(&self) -> Result<Vec<String>> {
        let keys = self.store.keys_with_prefix(&self.prefix)?;

        Ok(keys
            .into_iter()
            .filter(|stored| {
                stored
                    .strip_prefix(self.prefix.as_str())
                    .is_some_and(|rest| matches!(key::validate(rest), Ok(true)))
            })
            .collect())
    }
}

impl<S: EphemeralStore> Cache for EphemeralCache<S> {
    fn get(&self, key: &str, default: Value) -> Result<Value> {
        if !key::validate(key)? {
            return Ok(default);
        }

        match self.store.get(&self.prefixed(key)) {
            Ok(Some(value)) if !is_falsy(&value) => Ok(value),
            Ok(_) => Ok(default),
            Err(e) => {
                warn!(key, error = %e, "ephemeral store read failed");
                Ok(default)
            }
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Ttl>) -> Result<bool> {
        if !key::validate(key)? {
            return Ok(false);
        }

        let ttl_seconds = ttl::to_seconds(ttl);
        match self.store.set(&self.prefixed(key), value, ttl_seconds) {
            Ok(stored) => {
                debug!(key, ttl_seconds, stored, "ephemeral set");
                Ok(stored)
            }
            Err(e) => {
                warn!(key, error = %e, "ephemeral store write failed");
                Ok(false)
            }
        }
    }

    fn delete(&self, key: &str) -> Result<bool> {
        if !key::validate(key)? {
            return Ok(false);
        }

        match self.store.delete(&self.prefixed(key)) {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(key, error = %e, "ephemeral store delete failed");
                Ok(false)
            }
        }
    }

    fn clear(&self) -> bool {
        let keys = match self.own_keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(prefix = %self.prefix, error = %e, "failed to list ephemeral keys");
                return false;
            }
        };

        debug!(prefix = %self.prefix, count = keys.len(), "clearing ephemeral keys");

        batch::all_true(keys.iter().map(|stored| match self.store.delete(stored) {
            Ok(_) => true,
            Err(e) => {
                warn!(key = %stored, error = %e, "ephemeral store delete failed");
                false
            }
        }))
    }
}

/// Values that read back as a miss: null, false, zero, `""`, `"0"` and `[]`.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_prefix() {
        let store = MemoryStore::new();
        assert_eq!(EphemeralCache::new(&store).prefix(), "");
        assert_eq!(EphemeralCache::with_group(&store, "").prefix(), "");
        assert_eq!(EphemeralCache::with_group(&store, "users").prefix(), "users:");
    }

    #[test]
    fn test_set_forwards_prefixed_key_and_ttl() {
        let store = Arc::new(MemoryStore::new());
        let cache = EphemeralCache::with_group(store.clone(), "users");

        cache.set("alice", json!({"age": 30}), Some(Ttl::Seconds(60))).unwrap();

        assert_eq!(store.get("users:alice").unwrap(), Some(json!({"age": 30})));
        assert!(store.get("alice").unwrap().is_none());
    }

    #[test]
    fn test_groups_do_not_collide() {
        let store = Arc::new(MemoryStore::new());
        let users = EphemeralCache::with_group(store.clone(), "users");
        let admins = EphemeralCache::with_group(store.clone(), "users_admin");
        let plain = EphemeralCache::new(store.clone());

        users.set("admin_x", json!("from users"), None).unwrap();
        admins.set("x", json!("from admins"), None).unwrap();
        plain.set("x", json!("from plain"), None).unwrap();

        assert_eq!(users.get("admin_x", Value::Null).unwrap(), json!("from users"));
        assert_eq!(admins.get("x", Value::Null).unwrap(), json!("from admins"));
        assert_eq!(plain.get("x", Value::Null).unwrap(), json!("from plain"));
    }

    #[test]
    fn test_clear_only_touches_own_group() {
        let store = Arc::new(MemoryStore::new());
        let users = EphemeralCache::with_group(store.clone(), "users");
        let posts = EphemeralCache::with_group(store.clone(), "posts");
        let plain = EphemeralCache::new(store.clone());

        users.set("a", json!(1), None).unwrap();
        posts.set("a", json!(2), None).unwrap();
        plain.set("a", json!(3), None).unwrap();

        assert!(users.clear());
        assert!(!users.has("a").unwrap());
        assert!(posts.has("a").unwrap());

        assert!(plain.clear());
        assert!(!plain.has("a").unwrap());
        assert!(posts.has("a").unwrap(), "Ungrouped clear leaves grouped keys alone");
    }

    #[test]
    fn test_falsy_values_read_as_default() {
        let store = MemoryStore::new();
        let cache = EphemeralCache::new(&store);

        for (key, value) in [
            ("f_null", json!(null)),
            ("f_false", json!(false)),
            ("f_zero", json!(0)),
            ("f_zero_float", json!(0.0)),
            ("f_empty", json!("")),
            ("f_zero_str", json!("0")),
            ("f_empty_list", json!([])),
        ] {
            cache.set(key, value, None).unwrap();
            assert_eq!(cache.get(key, json!("default")).unwrap(), json!("default"), "{key}");
        }

        cache.set("t_obj", json!({}), None).unwrap();
        assert_eq!(cache.get("t_obj", Value::Null).unwrap(), json!({}));
    }

    #[test]
    fn test_empty_key_is_error() {
        let cache = EphemeralCache::new(MemoryStore::new());
        assert!(matches!(cache.delete(""), Err(CacheError::InvalidKeyType(_))));
    }

    // == Failing Store ==
    struct FailingStore;

    fn unavailable() -> CacheError {
        CacheError::Storage("store unavailable".to_string())
    }

    impl EphemeralStore for FailingStore {
        fn set(&self, _key: &str, _value: Value, _ttl_seconds: i64) -> Result<bool> {
            Err(unavailable())
        }

        fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(unavailable())
        }

        fn delete(&self, _key: &str) -> Result<bool> {
            Err(unavailable())
        }

        fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
            Err(unavailable())
        }
    }

    // == Loose Prefix Store ==
    /// Store whose prefix listing also returns keys outside the prefix.
    struct LoosePrefixStore {
        inner: MemoryStore,
    }

    impl EphemeralStore for LoosePrefixStore {
        fn set(&self, key: &str, value: Value, ttl_seconds: i64) -> Result<bool> {
            self.inner.set(key, value, ttl_seconds)
        }

        fn get(&self, key: &str) -> Result<Option<Value>> {
            self.inner.get(key)
        }

        fn delete(&self, key: &str) -> Result<bool> {
            self.inner.delete(key)
        }

        fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
            self.inner.keys_with_prefix("")
        }
    }

    #[test]
    fn test_clear_skips_keys_outside_prefix() {
        let store = LoosePrefixStore {
            inner: MemoryStore::new(),
        };
        store.inner.set("x", json!("short"), 0).unwrap();
        store.inner.set("USERS:a", json!("other case"), 0).unwrap();

        let cache = EphemeralCache::with_group(&store, "users");
        cache.set("a", json!("mine"), None).unwrap();

        assert!(cache.clear());
        assert!(!cache.has("a").unwrap());
        assert_eq!(store.inner.get("x").unwrap(), Some(json!("short")));
        assert_eq!(store.inner.get("USERS:a").unwrap(), Some(json!("other case")));
    }

    #[test]
    fn test_storage_failures_are_soft() {
        let cache = EphemeralCache::with_group(FailingStore, "g");

        assert!(!cache.set("a", json!(1), None).unwrap());
        assert_eq!(cache.get("a", json!("default")).unwrap(), json!("default"));
        assert!(!cache.delete("a").unwrap());
        assert!(!cache.clear());
        assert!(!cache.delete_multiple(&["a", "b"]).unwrap());
    }
}
