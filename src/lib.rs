//! Stash - A small key-value cache
//!
//! One cache contract over two backends: a file-per-key store that tracks
//! expiry itself, and a namespaced ephemeral store that leaves expiry to the
//! service underneath. An optional HTTP server exposes the contract.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, EphemeralCache, FileCache, Ttl, TtlInterval};
pub use config::Config;
pub use error::{CacheError, Result};
pub use storage::{EphemeralStore, Filesystem, LocalFilesystem, MemoryStore};
pub use tasks::spawn_cleanup_task;
