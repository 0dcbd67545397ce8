//! Route definitions for the GTMS HTTP API.
//!
//! All routes are mounted under `/api`. Patient routes live under
//! `/api/patient` and require a patient token; operator routes live under
//! `/api/admin`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(push_routes())
        .merge(location_routes())
        .merge(compliance_routes())
        .merge(sound_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Inbox, history and analytics
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/patient/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/patient/notifications/mark-all-read",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/patient/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/patient/notification-history",
            get(handlers::notification::notification_history),
        )
        .route(
            "/patient/notification-analytics",
            get(handlers::notification::notification_analytics),
        )
}

/// Browser push subscriptions
fn push_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/patient/push-subscribe",
            post(handlers::push::subscribe).delete(handlers::push::unsubscribe),
        )
        .route(
            "/push/vapid-public-key",
            get(handlers::push::vapid_public_key),
        )
}

/// Location reports and geofences
fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/patient/location",
            post(handlers::location::report_location),
        )
        .route(
            "/patient/location-reminders",
            get(handlers::location::list_reminders).post(handlers::location::create_reminder),
        )
}

/// Adherence reports
fn compliance_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/patient/compliance-report",
            get(handlers::compliance::compliance_report),
        )
        .route(
            "/patient/compliance-history",
            get(handlers::compliance::compliance_history),
        )
}

/// Static notification sounds
fn sound_routes() -> Router<AppState> {
    Router::new().route("/sounds/{filename}", get(handlers::sound::get_sound))
}

/// Operator endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/tasks", get(handlers::admin::list_tasks))
        .route("/admin/tasks/{name}/run", post(handlers::admin::run_task))
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
