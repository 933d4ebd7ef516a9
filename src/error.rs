//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache library and its HTTP surface.
///
/// A key that is a non-empty string but breaks the key grammar is *not* an
/// error: backends treat it as a miss. Only keys that are empty or not strings
/// at all surface as [`CacheError::InvalidKeyType`].
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty or not a string
    #[error("Invalid key type: {0}")]
    InvalidKeyType(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Cache directory cannot be used
    #[error("Invalid cache directory: {0}")]
    InvalidDirectory(String),

    /// The underlying store failed
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKeyType(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidDirectory(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
