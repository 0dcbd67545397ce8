//! Response DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gtms_core::types::pagination::PageResponse;
use gtms_service::compliance::ComplianceHistoryView;
use gtms_service::location::{FiredReminder, LocationReminderView};
use gtms_service::notification::{NotificationView, TypeAnalytics};
use gtms_worker::runner::{TaskInfo, TaskStatus};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Inbox listing.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationView>,
    pub unread_count: usize,
    pub sound_base_url: String,
    pub available_sounds: BTreeMap<&'static str, &'static str>,
}

/// Pagination block of the history search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
}

impl<T> From<&PageResponse<T>> for Pagination {
    fn from(page: &PageResponse<T>) -> Self {
        Self {
            current_page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            items_per_page: page.page_size,
        }
    }
}

/// History search results.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationHistoryResponse {
    pub notifications: Vec<NotificationView>,
    pub pagination: Pagination,
    pub filters: serde_json::Value,
}

/// Per-type analytics.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResponse {
    pub period_days: i64,
    pub analytics: Vec<TypeAnalytics>,
}

/// Result of a mark-read call.
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub notification_id: Uuid,
    /// `false` when it was already read.
    pub changed: bool,
}

/// Count of rows updated.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedResponse {
    pub updated: u64,
}

/// Saved subscription.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeResponse {
    pub subscription_id: Uuid,
}

/// Removed subscription.
#[derive(Debug, Clone, Serialize)]
pub struct UnsubscribeResponse {
    pub removed: bool,
}

/// Application server key.
#[derive(Debug, Clone, Serialize)]
pub struct VapidKeyResponse {
    pub public_key: String,
}

/// Result of a location report.
#[derive(Debug, Clone, Serialize)]
pub struct LocationReportResponse {
    pub location_recorded: bool,
    pub triggered_reminders: Vec<FiredReminder>,
}

/// Created location reminder.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderCreatedResponse {
    pub reminder_id: Uuid,
}

/// Active location reminders.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderListResponse {
    pub reminders: Vec<LocationReminderView>,
}

/// Stored compliance snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceHistoryResponse {
    pub reports: Vec<ComplianceHistoryView>,
}

/// Liveness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
}

/// Readiness with dependency status.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub database: String,
    pub push: String,
    pub scheduler_enabled: bool,
    pub tasks: Vec<TaskInfo>,
    pub checked_at: DateTime<Utc>,
}

/// Scheduled tasks and their last runs.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskInfo>,
}

/// Outcome of a manual task run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRunResponse {
    #[serde(flatten)]
    pub status: TaskStatus,
}
