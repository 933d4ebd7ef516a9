//! Cache Module
//!
//! The cache contract and its two backends: [`FileCache`], which persists one
//! record per key with its own expiry bookkeeping, and [`EphemeralCache`],
//! which hands expiry to an [`EphemeralStore`](crate::storage::EphemeralStore).

pub mod batch;
mod ephemeral;
mod file;
pub mod item;
pub mod key;
pub mod ttl;


use serde_json::{Map, Value};

use crate::error::Result;

// Re-export public types
pub use ephemeral::{EphemeralCache, GROUP_SEPARATOR};
pub use file::{FileCache, DEFAULT_EXTENSION};
pub use item::CacheItem;
pub use ttl::{Ttl, TtlInterval};

// == Cache Trait ==
/// The operations shared by every cache backend.
///
/// Keys that are empty fail with [`CacheError::InvalidKeyType`]. Keys that
/// break the key grammar are treated as absent: reads return the default and
/// writes return `false`. Storage failures are also reported as `false` or
/// the default rather than as errors.
///
/// [`CacheError::InvalidKeyType`]: crate::error::CacheError::InvalidKeyType
pub trait Cache: Send + Sync {
    /// Returns the live value for `key`, or `default`.
    fn get(&self, key: &str, default: Value) -> Result<Value>;

    /// Stores `value` under `key`. An absent or zero TTL never expires.
    fn set(&self, key: &str, value: Value, ttl: Option<Ttl>) -> Result<bool>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Removes every key in this cache's scope.
    fn clear(&self) -> bool;

    /// Returns true if `key` holds a live, non-null value.
    fn has(&self, key: &str) -> Result<bool> {
        Ok(!self.get(key, Value::Null)?.is_null())
    }

    /// Looks up each key, mapping misses to `default`. Input order is kept.
    fn get_multiple(&self, keys: &[&str], default: Value) -> Result<Map<String, Value>> {
        batch::collect_values(keys, |key| self.get(key, default.clone()))
    }

    /// Stores every entry of `values`; true only if every write succeeded.
    fn set_multiple(&self, values: &Map<String, Value>, ttl: Option<Ttl>) -> Result<bool> {
        batch::fold_results(values.keys().map(String::as_str), |key| {
            self.set(key, values[key].clone(), ttl)
        })
    }

    /// Removes every key; true only if every removal succeeded.
    fn delete_multiple(&self, keys: &[&str]) -> Result<bool> {
        batch::fold_results(keys.iter().copied(), |key| self.delete(key))
    }
}
