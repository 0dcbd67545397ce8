//! Raw aggregates read by the compliance engine.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Dose outcomes for one active medication over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MedicationUsageRow {
    /// Medication.
    pub medication_id: Uuid,
    /// Medication display name.
    pub medication_name: String,
    /// Distinct calendar days with at least one usage record.
    pub days_with_records: i64,
    /// Usage records in the window.
    pub total: i64,
    /// Records marked taken.
    pub taken: i64,
    /// Records marked skipped.
    pub skipped: i64,
    /// Records marked delayed.
    pub delayed: i64,
    /// Mean lateness of delayed doses that recorded an actual time.
    pub avg_delay_minutes: Option<f64>,
}

/// Appointment outcomes over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AppointmentCounts {
    /// All appointments.
    pub total: i64,
    /// Completed.
    pub attended: i64,
    /// No-shows.
    pub missed: i64,
    /// Cancelled.
    pub cancelled: i64,
    /// Rescheduled.
    pub rescheduled: i64,
}

/// Read behaviour for one notification type over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NotificationReadStats {
    /// Notification type.
    pub notification_type: String,
    /// Notifications created.
    pub total: i64,
    /// Notifications read.
    pub read_count: i64,
    /// Mean minutes from creation to read.
    pub avg_response_minutes: Option<f64>,
}
