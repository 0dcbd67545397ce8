//! Location report and geofence reminder handlers.

use axum::Json;
use axum::extract::State;

use gtms_core::error::AppError;
use gtms_entity::location::{Coordinate, TriggerMode};
use gtms_service::location::NewReminderInput;

use crate::dto::request::{CreateLocationReminderRequest, LocationReportRequest, validate_with};
use crate::dto::response::{
    ApiResponse, LocationReportResponse, ReminderCreatedResponse, ReminderListResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, JsonBody};
use crate::middleware::rbac::require_patient;
use crate::state::AppState;

fn coordinate(latitude: Option<f64>, longitude: Option<f64>) -> Result<Coordinate, AppError> {
    latitude
        .zip(longitude)
        .and_then(|(lat, lon)| Coordinate::new(lat, lon))
        .ok_or_else(|| {
            AppError::validation("INVALID_LOCATION", "Latitude and longitude are required")
        })
}

/// POST /api/patient/location
pub async fn report_location(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<LocationReportRequest>,
) -> Result<Json<ApiResponse<LocationReportResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    validate_with(&body, "INVALID_LOCATION")?;
    let position = coordinate(body.latitude, body.longitude)?;

    let triggered_reminders = state
        .location_service
        .report(&auth, position, body.accuracy, body.address)
        .await?;
    Ok(Json(ApiResponse::ok(LocationReportResponse {
        location_recorded: true,
        triggered_reminders,
    })))
}

/// POST /api/patient/location-reminders
pub async fn create_reminder(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<CreateLocationReminderRequest>,
) -> Result<Json<ApiResponse<ReminderCreatedResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    validate_with(&body, "MISSING_DATA")?;
    let centre = coordinate(body.latitude, body.longitude)?;

    let trigger = body
        .trigger_type
        .as_deref()
        .map(|t| {
            TriggerMode::parse(t).ok_or_else(|| {
                AppError::validation(
                    "INVALID_TRIGGER_TYPE",
                    "trigger_type must be enter, exit or both",
                )
            })
        })
        .transpose()?;

    let input = NewReminderInput {
        location_name: body.location_name.unwrap_or_default(),
        centre,
        radius_meters: body.radius,
        reminder_type: body.reminder_type.unwrap_or_default(),
        reminder_message: body.reminder_message.unwrap_or_default(),
        trigger,
    };
    let reminder_id = state.location_service.create_reminder(&auth, input).await?;
    Ok(Json(ApiResponse::ok(ReminderCreatedResponse { reminder_id })))
}

/// GET /api/patient/location-reminders
pub async fn list_reminders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ReminderListResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    let reminders = state.location_service.list_reminders(&auth).await?;
    Ok(Json(ApiResponse::ok(ReminderListResponse { reminders })))
}
