//! Application builder: wires router, middleware and state into an Axum app.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use gtms_core::config::AppConfig;
use gtms_core::error::AppError;
use gtms_database::{DatabasePool, Stores};
use gtms_push::{PushTransport, WebPushTransport};
use gtms_worker::CronScheduler;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Push transport from configuration, or `None` when push is disabled or
/// the VAPID key is unusable.
pub fn push_transport(config: &AppConfig) -> Option<Arc<dyn PushTransport>> {
    if !config.push.is_configured() {
        tracing::info!("Web Push not configured; notifications stay in-app");
        return None;
    }
    match WebPushTransport::from_config(&config.push) {
        Ok(transport) => Some(Arc::new(transport)),
        Err(e) => {
            tracing::error!(error = %e, "Invalid push configuration; push delivery disabled");
            None
        }
    }
}

/// Runs the GTMS server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db: DatabasePool) -> Result<(), AppError> {
    tracing::info!("Starting GTMS server...");

    // ── Step 1: Services ─────────────────────────────────────────
    let stores = Stores::postgres(db.pool().clone());
    let transport = push_transport(&config);
    let state = AppState::new(config.clone(), stores, Some(db.clone()), transport);

    // ── Step 2: Scheduler ────────────────────────────────────────
    let mut scheduler = if config.scheduler.enabled {
        let scheduler = CronScheduler::new(Arc::clone(&state.task_runner)).await?;
        scheduler.register_tasks().await?;
        Some(scheduler)
    } else {
        tracing::info!("Scheduler disabled");
        None
    };
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.start().await?;
    }

    // ── Step 3: HTTP server ──────────────────────────────────────
    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("GTMS server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 4: Shutdown ─────────────────────────────────────────
    if let Some(mut scheduler) = scheduler {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        match tokio::time::timeout(grace, scheduler.shutdown()).await {
            Ok(Err(e)) => tracing::warn!(error = %e, "Scheduler shutdown failed"),
            Err(_) => tracing::warn!("Scheduler shutdown timed out"),
            Ok(Ok(())) => {}
        }
    }
    db.close().await;
    tracing::info!("GTMS server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
