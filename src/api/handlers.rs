//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Cache calls may hit
//! the disk, so they run on the blocking thread pool.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::Cache;
use crate::error::{CacheError, Result};
use crate::models::{
    BatchResponse, ClearResponse, DeleteResponse, GetManyResponse, GetResponse, HasResponse,
    HealthResponse, KeysRequest, SetManyRequest, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
pub struct AppState<C> {
    /// The cache backend being served
    pub cache: Arc<C>,
    /// Backend name reported by the health endpoint
    pub backend: String,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            backend: self.backend.clone(),
        }
    }
}

impl<C: Cache + 'static> AppState<C> {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: C, backend: impl Into<String>) -> Self {
        Self {
            cache: Arc::new(cache),
            backend: backend.into(),
        }
    }

    /// Runs `op` against the cache on the blocking thread pool.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&C) -> Result<T> + Send + 'static,
    {
        let cache = self.cache.clone();
        tokio::task::spawn_blocking(move || op(&cache))
            .await
            .map_err(|e| CacheError::Internal(e.to_string()))?
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL.
pub async fn set_handler<C: Cache + 'static>(
    State(state): State<AppState<C>>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    let key = req.key()?.to_string();
    let ttl = req.ttl();
    let value = req.value;

    let stored = {
        let key = key.clone();
        state.run(move |cache| cache.set(&key, value, ttl)).await?
    };

    Ok(Json(SetResponse::new(key, stored)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key. Misses and null values are 404.
pub async fn get_handler<C: Cache + 'static>(
    State(state): State<AppState<C>>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = {
        let key = key.clone();
        state.run(move |cache| cache.get(&key, Value::Null)).await?
    };

    if value.is_null() {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /has/:key
pub async fn has_handler<C: Cache + 'static>(
    State(state): State<AppState<C>>,
    Path(key): Path<String>,
) -> Result<Json<HasResponse>> {
    let exists = {
        let key = key.clone();
        state.run(move |cache| cache.has(&key)).await?
    };

    Ok(Json(HasResponse { key, exists }))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache. Deleting an absent key succeeds.
pub async fn delete_handler<C: Cache + 'static>(
    State(state): State<AppState<C>>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let deleted = {
        let key = key.clone();
        state.run(move |cache| cache.delete(&key)).await?
    };

    Ok(Json(DeleteResponse::new(key, deleted)))
}

/// Handler for POST /clear
pub async fn clear_handler<C: Cache + 'static>(
    State(state): State<AppState<C>>,
) -> Result<Json<ClearResponse>> {
    let cleared = state.run(|cache| Ok(cache.clear())).await?;

    Ok(Json(ClearResponse { cleared }))
}

/// Handler for POST /get-many
///
/// Returns every requested key, mapping misses to the request's default.
pub async fn get_many_handler<C: Cache + 'static>(
    State(state): State<AppState<C>>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<GetManyResponse>> {
    let keys: Vec<String> = req.keys()?.into_iter().map(str::to_string).collect();
    let default = req.default;

    let values = state
        .run(move |cache| {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            cache.get_multiple(&keys, default)
        })
        .await?;

    Ok(Json(GetManyResponse { values }))
}

/// Handler for PUT /set-many
pub async fn set_many_handler<C: Cache + 'static>(
    State(state): State<AppState<C>>,
    Json(req): Json<SetManyRequest>,
) -> Result<Json<BatchResponse>> {
    let ttl = req.ttl();
    let values = req.values;

    let success = state
        .run(move |cache| cache.set_multiple(&values, ttl))
        .await?;

    Ok(Json(BatchResponse { success }))
}

/// Handler for POST /delete-many
pub async fn delete_many_handler<C: Cache + 'static>(
    State(state): State<AppState<C>>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<BatchResponse>> {
    let keys: Vec<String> = req.keys()?.into_iter().map(str::to_string).collect();

    let success = state
        .run(move |cache| {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            cache.delete_multiple(&keys)
        })
        .await?;

    Ok(Json(BatchResponse { success }))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler<C: Cache + 'static>(
    State(state): State<AppState<C>>,
) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.backend.clone()))
}
