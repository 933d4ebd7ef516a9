//! API Module
//!
//! HTTP handlers and routing exposing the cache contract as a REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /has/:key` - Check whether a key holds a live value
//! - `DELETE /del/:key` - Delete a key
//! - `POST /clear` - Delete every key in scope
//! - `POST /get-many`, `PUT /set-many`, `POST /delete-many` - Batch operations
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
