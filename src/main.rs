//! dircache - Storage gateway with a directory list cache
//!
//! Serves an in-memory, eventually-consistent object store over HTTP with
//! listings supplemented by the directory list cache.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dircache::api::create_router;
use dircache::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the storage gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the in-memory store behind the cache-supplemented decorator
/// 4. Start the background expiry sweep
/// 5. Serve HTTP until SIGINT/SIGTERM, then shut down gracefully
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dircache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting dircache storage gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entry_age={}ms, max_info_age={}ms, port={}, cleanup_interval={}s, list_delay={}ms, markers={}",
        config.max_entry_age_ms,
        config.max_info_age_ms,
        config.server_port,
        config.cleanup_interval,
        config.list_visibility_delay_ms,
        config.create_marker_objects
    );
    if !config.cache_config().is_consistent() {
        warn!(
            "MAX_INFO_AGE_MS ({}) exceeds MAX_ENTRY_AGE_MS ({}); metadata expires with its entry",
            config.max_info_age_ms, config.max_entry_age_ms
        );
    }

    let state = AppState::from_config(&config);
    info!("Directory list cache initialized");

    let sweeper = if config.cleanup_interval > 0 {
        info!("Background expiry sweep started");
        Some(spawn_cleanup_task(state.cache.clone(), config.cleanup_interval))
    } else {
        info!("Background expiry sweep disabled");
        None
    };

    let storage = state.storage.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeper))
        .await
        .context("server error")?;

    storage.close().context("failed to close storage")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep.
async fn shutdown_signal(sweeper: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    if let Some(handle) = sweeper {
        handle.abort();
        warn!("Expiry sweep aborted");
    }
}
