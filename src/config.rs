//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::DEFAULT_EXTENSION;

/// Which cache backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// One file per key under `cache_dir`
    File,
    /// In-process store with native expiry
    Ephemeral,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "ephemeral" | "memory" => Ok(BackendKind::Ephemeral),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::File => f.write_str("file"),
            BackendKind::Ephemeral => f.write_str("ephemeral"),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache backend to serve
    pub backend: BackendKind,
    /// Directory for the file backend
    pub cache_dir: PathBuf,
    /// Cache file extension for the file backend
    pub extension: String,
    /// Key namespace for the ephemeral backend
    pub group: Option<String>,
    /// HTTP server port
    pub server_port: u16,
    /// Interval in seconds between expiry sweeps of the ephemeral store
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `file` or `ephemeral` (default: file)
    /// - `CACHE_DIR` - File backend directory (default: ./cache)
    /// - `CACHE_EXTENSION` - File backend extension (default: .do)
    /// - `CACHE_GROUP` - Ephemeral backend namespace (default: none)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            backend: env::var("CACHE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backend),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            extension: env::var("CACHE_EXTENSION").unwrap_or(defaults.extension),
            group: env::var("CACHE_GROUP").ok().filter(|v| !v.is_empty()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::File,
            cache_dir: PathBuf::from("./cache"),
            extension: DEFAULT_EXTENSION.to_string(),
            group: None,
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
