//! Notification inbox handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use uuid::Uuid;

use gtms_core::error::AppError;
use gtms_entity::notification::{NotificationFilter, NotificationSound, ReadState};

use crate::dto::request::{NotificationHistoryQuery, NotificationListQuery, PeriodQuery};
use crate::dto::response::{
    AnalyticsResponse, ApiResponse, MarkReadResponse, NotificationHistoryResponse,
    NotificationListResponse, Pagination, UpdatedResponse,
};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_patient;
use crate::state::AppState;

const DEFAULT_ANALYTICS_DAYS: i64 = 30;

/// GET /api/patient/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<ApiResponse<NotificationListResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    let notifications = state
        .notification_service
        .list(&auth, query.unread_only, query.limit)
        .await?;

    let unread_count = notifications
        .iter()
        .filter(|n| !n.notification.is_read)
        .count();
    let available_sounds = NotificationSound::ALL
        .iter()
        .map(|s| (s.key(), s.file_name()))
        .collect();

    Ok(Json(ApiResponse::ok(NotificationListResponse {
        notifications,
        unread_count,
        sound_base_url: state.config.sounds.base_url.clone(),
        available_sounds,
    })))
}

/// PUT /api/patient/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MarkReadResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    let changed = state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MarkReadResponse {
        notification_id: id,
        changed,
    })))
}

/// PUT /api/patient/notifications/mark-all-read
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UpdatedResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    let updated = state.notification_service.mark_all_read(&auth).await?;
    Ok(Json(ApiResponse::ok(UpdatedResponse { updated })))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
                AppError::validation("INVALID_FILTER", format!("{field} must be YYYY-MM-DD"))
            })
        })
        .transpose()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /api/patient/notification-history
pub async fn notification_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NotificationHistoryQuery>,
) -> Result<Json<ApiResponse<NotificationHistoryResponse>>, ApiError> {
    require_patient(&state, &auth)?;

    let filter = NotificationFilter {
        start_date: parse_date(query.start_date.as_deref(), "start_date")?,
        end_date: parse_date(query.end_date.as_deref(), "end_date")?,
        status: query.status.as_deref().and_then(ReadState::parse),
        notification_type: non_empty(query.notification_type),
        priority: non_empty(query.priority),
        search: non_empty(query.search),
    };

    let page = state
        .notification_service
        .history(&auth, &filter, query.page, query.limit)
        .await?;
    let pagination = Pagination::from(&page);

    Ok(Json(ApiResponse::ok(NotificationHistoryResponse {
        notifications: page.items,
        pagination,
        filters: serde_json::to_value(&filter).map_err(AppError::from)?,
    })))
}

/// GET /api/patient/notification-analytics
pub async fn notification_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<AnalyticsResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    let period_days = query
        .period
        .filter(|p| (1..=365).contains(p))
        .unwrap_or(DEFAULT_ANALYTICS_DAYS);
    let analytics = state
        .notification_service
        .analytics(&auth, period_days)
        .await?;
    Ok(Json(ApiResponse::ok(AnalyticsResponse {
        period_days,
        analytics,
    })))
}
