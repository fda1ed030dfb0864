//! Application builder: wires stores, services, the notification runner,
//! and the router into a running server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;

use reliefhub_core::config::AppConfig;
use reliefhub_core::error::AppError;
use reliefhub_database::Stores;
use reliefhub_worker::{HttpTransport, notification_channel};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the ReliefHub server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ReliefHub server...");

    // ── Step 1: Stores ───────────────────────────────────────────
    tracing::info!(provider = ?config.database.provider, "Initializing stores...");
    let stores = Stores::connect(&config.database).await?;

    // ── Step 2: Notification dispatch ────────────────────────────
    let transport = Arc::new(HttpTransport::new(Duration::from_secs(
        config.notifications.timeout_seconds,
    ))?);
    let (dispatcher, runner) = notification_channel(&config.notifications, transport);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner_handle = match runner {
        Some(runner) => Some(tokio::spawn(runner.run(shutdown_rx))),
        None => {
            tracing::info!("Notifications disabled; events will be dropped");
            None
        }
    };

    // ── Step 3: Build and start HTTP server ──────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::new(config, stores.clone(), dispatcher);
    let app = build_app(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("ReliefHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 4: Drain notifications and close the pool ───────────
    if let Some(handle) = runner_handle {
        match tokio::time::timeout(grace, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Notification runner panicked"),
            Err(_) => tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Notification runner did not finish within the shutdown grace period"
            ),
        }
    }
    if let Some(pool) = &stores.pool {
        pool.close().await;
    }

    tracing::info!("ReliefHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
