//! Per-type notification aggregates.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Read and delivery counts for one notification type over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NotificationTypeStats {
    /// Notification type.
    pub notification_type: String,
    /// Notifications created.
    pub total: i64,
    /// Notifications read.
    pub read_count: i64,
    /// Notifications with a successful push.
    pub push_sent_count: i64,
    /// Mean minutes from creation to read, over read notifications.
    pub avg_read_minutes: Option<f64>,
}
