//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::{Map, Value};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the HAS operation (GET /has/:key)
#[derive(Debug, Clone, Serialize)]
pub struct HasResponse {
    /// The requested key
    pub key: String,
    /// Whether the key holds a live value
    pub exists: bool,
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Outcome message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Whether the value was stored
    pub stored: bool,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, stored: bool) -> Self {
        let key = key.into();
        let message = if stored {
            format!("Key '{}' set successfully", key)
        } else {
            format!("Key '{}' was not stored", key)
        };
        Self {
            message,
            key,
            stored,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Outcome message
    pub message: String,
    /// The key that was deleted
    pub key: String,
    /// Whether the key is gone
    pub deleted: bool,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>, deleted: bool) -> Self {
        let key = key.into();
        let message = if deleted {
            format!("Key '{}' deleted successfully", key)
        } else {
            format!("Key '{}' was not deleted", key)
        };
        Self {
            message,
            key,
            deleted,
        }
    }
}

/// Response body for the CLEAR operation (POST /clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Whether every key in scope was removed
    pub cleared: bool,
}

/// Response body for the batch GET operation (POST /get-many)
#[derive(Debug, Clone, Serialize)]
pub struct GetManyResponse {
    /// Requested keys mapped to their values, in request order
    pub values: Map<String, Value>,
}

/// Response body for the batch SET and DELETE operations
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    /// True only if every per-key operation succeeded
    pub success: bool,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Backend serving the cache
    pub backend: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(backend: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            backend: backend.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
