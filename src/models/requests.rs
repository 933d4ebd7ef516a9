//! Request DTOs for the cache server API
//!
//! Keys arrive as arbitrary JSON so that non-string keys can be rejected with
//! the same error the library raises for empty keys.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::cache::{key, Ttl};
use crate::error::Result;

/// Request body for the SET operation (PUT /set)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: Value,
    /// The value to store
    #[serde(default)]
    pub value: Value,
    /// Optional TTL: seconds, an interval object or a phrase like "2 minutes"
    #[serde(default)]
    pub ttl: Option<Value>,
}

impl SetRequest {
    /// Returns the key, failing if it is not a string.
    pub fn key(&self) -> Result<&str> {
        key::key_from_value(&self.key)
    }

    /// Returns the interpreted TTL; unrecognized input means "never expires".
    pub fn ttl(&self) -> Option<Ttl> {
        self.ttl.as_ref().and_then(Ttl::from_json)
    }
}

/// Request body for the batch SET operation (PUT /set-many)
#[derive(Debug, Clone, Deserialize)]
pub struct SetManyRequest {
    /// Key-value pairs to store
    pub values: Map<String, Value>,
    /// Optional TTL applied to every pair
    #[serde(default)]
    pub ttl: Option<Value>,
}

impl SetManyRequest {
    /// Returns the interpreted TTL; unrecognized input means "never expires".
    pub fn ttl(&self) -> Option<Ttl> {
        self.ttl.as_ref().and_then(Ttl::from_json)
    }
}

/// Request body for the batch GET and DELETE operations
#[derive(Debug, Clone, Deserialize)]
pub struct KeysRequest {
    /// Keys to operate on
    pub keys: Vec<Value>,
    /// Value returned for misses (GET only)
    #[serde(default)]
    pub default: Value,
}

impl KeysRequest {
    /// Returns the keys, failing on the first one that is not a string.
    pub fn keys(&self) -> Result<Vec<&str>> {
        self.keys.iter().map(key::key_from_value).collect()
    }
}
