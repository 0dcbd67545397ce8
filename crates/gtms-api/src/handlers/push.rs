//! Push subscription handlers.

use axum::Json;
use axum::extract::State;

use gtms_core::error::AppError;
use gtms_service::push::SubscribeInput;

use crate::dto::request::{PushSubscribeRequest, PushUnsubscribeRequest};
use crate::dto::response::{
    ApiResponse, SubscribeResponse, UnsubscribeResponse, VapidKeyResponse,
};
use crate::error::{ApiError, FEATURE_NOT_AVAILABLE};
use crate::extractors::{AuthUser, JsonBody};
use crate::middleware::rbac::require_patient;
use crate::state::AppState;

/// POST /api/patient/push-subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<PushSubscribeRequest>,
) -> Result<Json<ApiResponse<SubscribeResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    let subscription = body.subscription.ok_or_else(|| {
        AppError::validation("INVALID_SUBSCRIPTION", "Missing subscription object")
    })?;

    let subscription_id = state
        .subscription_service
        .subscribe(
            &auth,
            SubscribeInput {
                endpoint: subscription.endpoint,
                p256dh: subscription.keys.p256dh,
                auth: subscription.keys.auth,
                device_info: body.device_info,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(SubscribeResponse { subscription_id })))
}

/// DELETE /api/patient/push-subscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<PushUnsubscribeRequest>,
) -> Result<Json<ApiResponse<UnsubscribeResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    let removed = state
        .subscription_service
        .unsubscribe(&auth, body.endpoint)
        .await?;
    Ok(Json(ApiResponse::ok(UnsubscribeResponse { removed })))
}

/// GET /api/push/vapid-public-key
pub async fn vapid_public_key(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<VapidKeyResponse>>, ApiError> {
    let public_key = state.subscription_service.public_key().ok_or_else(|| {
        AppError::service_unavailable("Push notifications are not configured")
            .with_code(FEATURE_NOT_AVAILABLE)
    })?;
    Ok(Json(ApiResponse::ok(VapidKeyResponse {
        public_key: public_key.to_string(),
    })))
}
