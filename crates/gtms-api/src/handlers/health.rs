//! Health check handlers.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let database = match &state.db {
        Some(db) => match db.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Health check: database unreachable");
                "unreachable"
            }
        },
        None => "in_memory",
    };
    let push = if state.subscription_service.public_key().is_some() {
        "configured"
    } else {
        "disabled"
    };

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if database == "unreachable" { "degraded" } else { "ok" }.to_string(),
        database: database.to_string(),
        push: push.to_string(),
        scheduler_enabled: state.config.scheduler.enabled,
        tasks: state.task_runner.tasks(),
        checked_at: Utc::now(),
    }))
}
