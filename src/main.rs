//! Stash - A small key-value cache server
//!
//! Serves the cache contract over HTTP on top of either the file backend or
//! the ephemeral backend.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stash::api::create_router;
use stash::config::BackendKind;
use stash::{spawn_cleanup_task, AppState, Cache, Config, EphemeralCache, FileCache, MemoryStore};

/// Main entry point for the Stash cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the configured cache backend
/// 4. Start the expiry sweep task (ephemeral backend only)
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stash=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Stash cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={}, port={}, cleanup_interval={}s",
        config.backend, config.server_port, config.cleanup_interval
    );

    match config.backend {
        BackendKind::File => {
            let cache = FileCache::with_extension(&config.cache_dir, config.extension.clone())
                .context("failed to create file cache")?;
            info!("File cache initialized at {}", cache.dir().display());

            serve(AppState::new(cache, config.backend.to_string()), &config, None).await
        }
        BackendKind::Ephemeral => {
            let store = Arc::new(MemoryStore::new());
            let cache = match &config.group {
                Some(group) => EphemeralCache::with_group(store.clone(), group.clone()),
                None => EphemeralCache::new(store.clone()),
            };
            info!("Ephemeral cache initialized with prefix '{}'", cache.prefix());

            let cleanup_handle = spawn_cleanup_task(store, config.cleanup_interval);
            info!("Background expiry sweep started");

            serve(
                AppState::new(cache, config.backend.to_string()),
                &config,
                Some(cleanup_handle),
            )
            .await
        }
    }
}

/// Binds the configured port and serves the router until a shutdown signal.
async fn serve<C: Cache + 'static>(
    state: AppState<C>,
    config: &Config,
    cleanup_handle: Option<JoinHandle<()>>,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Expiry sweep task aborted");
    }
}
