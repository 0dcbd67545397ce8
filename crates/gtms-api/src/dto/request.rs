//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use gtms_core::error::AppError;

/// `GET /patient/notifications` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListQuery {
    /// Only unread rows.
    #[serde(default)]
    pub unread_only: bool,
    /// Row limit; out-of-range values fall back to the default.
    pub limit: Option<i64>,
}

/// `GET /patient/notification-history` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationHistoryQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

/// `?period=` query shared by analytics and compliance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<i64>,
}

/// `GET /patient/compliance-report` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplianceReportQuery {
    pub period: Option<i64>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
}

/// `?limit=` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

/// Browser subscription keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionKeysBody {
    pub p256dh: Option<String>,
    pub auth: Option<String>,
}

/// `PushSubscription.toJSON()` as sent by the browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionBody {
    pub endpoint: Option<String>,
    #[serde(default)]
    pub keys: SubscriptionKeysBody,
}

/// `POST /patient/push-subscribe` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushSubscribeRequest {
    pub subscription: Option<SubscriptionBody>,
    pub device_info: Option<serde_json::Value>,
}

/// `DELETE /patient/push-subscribe` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushUnsubscribeRequest {
    pub endpoint: Option<String>,
}

/// `POST /patient/location` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LocationReportRequest {
    #[validate(required, range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(required, range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(range(min = 0.0))]
    pub accuracy: Option<f64>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

/// `POST /patient/location-reminders` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateLocationReminderRequest {
    #[validate(required, length(min = 1, max = 200))]
    pub location_name: Option<String>,
    #[validate(required)]
    pub latitude: Option<f64>,
    #[validate(required)]
    pub longitude: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 50000.0))]
    pub radius: Option<f64>,
    #[validate(required, length(min = 1))]
    pub reminder_type: Option<String>,
    #[validate(required, length(min = 1))]
    pub reminder_message: Option<String>,
    pub trigger_type: Option<String>,
}

/// Run validator rules, reporting failures under `code`.
pub fn validate_with(value: &impl Validate, code: &'static str) -> Result<(), AppError> {
    value.validate().map_err(|errors| {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        fields.sort_unstable();
        AppError::validation(code, format!("Invalid or missing fields: {}", fields.join(", ")))
    })
}
