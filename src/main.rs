//! Estate Cache - cache and telemetry service
//!
//! Boots the cache, the monitor, the background tasks and the HTTP API.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estate_cache::{
    create_router, spawn_expiry_sweep, spawn_retention_task, AppState, BackgroundTask, Config,
};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache, monitor and rate limiter, then connect the cache
/// 4. Start the expiry sweep and telemetry retention tasks
/// 5. Serve the router until SIGINT/SIGTERM
/// 6. Stop the tasks and disconnect the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estate_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Estate Cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: redis={}, default_ttl={}s, port={}, sweep_interval={}s",
        config.redis_url.is_some(),
        config.default_ttl,
        config.server_port,
        config.sweep_interval
    );

    let state = AppState::from_config(&config);
    let mode = state.cache.connect().await;
    info!(?mode, "Cache service ready");

    let tasks = vec![
        spawn_expiry_sweep(
            state.cache.clone(),
            Duration::from_secs(config.sweep_interval),
        ),
        spawn_retention_task(
            state.monitor.clone(),
            state.limiter.clone(),
            Duration::from_secs(config.metrics_cleanup_interval),
            config.metrics_retention_hours,
        ),
    ];
    info!("Background tasks started");

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tasks))
        .await
        .context("server error")?;

    state.cache.disconnect().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the background tasks.
async fn shutdown_signal(tasks: Vec<BackgroundTask>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    for task in &tasks {
        task.stop();
    }
    warn!("Background tasks stopped");
}
