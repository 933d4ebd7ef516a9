//! Ephemeral Store Module
//!
//! The key-value service interface used by the ephemeral backend, and an
//! in-process implementation that enforces per-key expiry itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

// == Ephemeral Store Trait ==
/// A key-value service with native expiry.
///
/// Implementations own expiry: a value written with a positive TTL must stop
/// being returned once that TTL has elapsed.
pub trait EphemeralStore: Send + Sync {
    /// Stores `value` under `key`. A TTL of 0 never expires.
    fn set(&self, key: &str, value: Value, ttl_seconds: i64) -> Result<bool>;

    /// Returns the live value for `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Removes `key`, returning whether it was present.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Lists every live key starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

impl<S: EphemeralStore + ?Sized> EphemeralStore for &S {
    fn set(&self, key: &str, value: Value, ttl_seconds: i64) -> Result<bool> {
        (**self).set(key, value, ttl_seconds)
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys_with_prefix(prefix)
    }
}

impl<S: EphemeralStore + ?Sized> EphemeralStore for Arc<S> {
    fn set(&self, key: &str, value: Value, ttl_seconds: i64) -> Result<bool> {
        (**self).set(key, value, ttl_seconds)
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys_with_prefix(prefix)
    }
}

// == Stored Value ==
#[derive(Debug, Clone)]
struct StoredValue {
    value: Value,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<i64>,
}

impl StoredValue {
    fn new(value: Value, ttl_seconds: i64, now_ms: i64) -> Self {
        let expires_at =
            (ttl_seconds != 0).then(|| now_ms.saturating_add(ttl_seconds.saturating_mul(1000)));

        Self { value, expires_at }
    }

    /// Expired once the current time reaches the expiration time.
    fn is_expired(&self, now_ms: i64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }
}

// == Memory Store ==
/// In-process [`EphemeralStore`] with lazy expiry on read and an explicit
/// [`purge_expired`](MemoryStore::purge_expired) sweep.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Purge Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries();
        let before = entries.len();

        entries.retain(|_, stored| !stored.is_expired(now));

        before - entries.len()
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, StoredValue>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EphemeralStore for MemoryStore {
    fn set(&self, key: &str, value: Value, ttl_seconds: i64) -> Result<bool> {
        let mut entries = self.entries();

        if ttl_seconds < 0 {
            debug!(key, ttl_seconds, "negative ttl, dropping value");
            entries.remove(key);
            return Ok(true);
        }

        let stored = StoredValue::new(value, ttl_seconds, current_timestamp_ms());
        entries.insert(key.to_string(), stored);
        Ok(true)
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = current_timestamp_ms();
        let mut entries = self.entries();

        if entries.get(key).is_some_and(|stored| stored.is_expired(now)) {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|stored| stored.value.clone()))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries().remove(key).is_some())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let now = current_timestamp_ms();
        let mut keys: Vec<String> = self
            .entries()
            .iter()
            .filter(|(key, stored)| key.starts_with(prefix) && !stored.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        keys.sort();
        Ok(keys)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}
