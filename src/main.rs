//! Match Cache - two-layer cache service for football statistics data
//!
//! Serves the cache manager over a local HTTP surface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use match_cache::{create_router, spawn_sweep_task, AppState, CacheManager, Config, FileStore};

/// Main entry point for the cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the persistent layer (falls back to memory-only if it cannot)
/// 4. Warm the memory layer with the essential keys
/// 5. Start the background expiry sweep
/// 6. Serve the HTTP API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "match_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting match cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_memory_items={}, default_ttl={}ms, persistent_layer={}, port={}, sweep_interval={}s",
        config.max_memory_items,
        config.default_ttl_ms,
        config.use_persistent_layer,
        config.server_port,
        config.sweep_interval
    );

    let cache = if config.use_persistent_layer {
        match FileStore::open(&config.store_dir).await {
            Ok(store) => {
                info!("Persistent layer opened at {}", config.store_dir.display());
                CacheManager::new(&config, Arc::new(store))
            }
            Err(e) => {
                warn!(
                    "Could not open persistent layer at {}: {}; running memory-only",
                    config.store_dir.display(),
                    e
                );
                CacheManager::memory_only(&config)
            }
        }
    } else {
        CacheManager::memory_only(&config)
    };
    let cache = Arc::new(cache);

    if cache.warmup().await {
        info!("Cache warmup finished");
    } else {
        warn!("Cache warmup incomplete; continuing with a cold memory layer");
    }

    let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(config.sweep_interval));
    info!("Background expiry sweep started");

    let app = create_router(AppState::new(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
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

    sweep_handle.abort();
    warn!("Expiry sweep aborted");
}
