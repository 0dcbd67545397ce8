//! Appointment rows.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked and upcoming.
    Scheduled,
    /// Attended.
    Completed,
    /// Not attended.
    NoShow,
    /// Cancelled.
    Cancelled,
    /// Moved to another slot.
    Rescheduled,
}

impl AppointmentStatus {
    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
        }
    }
}

/// A booked appointment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    /// Appointment identifier.
    pub id: Uuid,
    /// Patient.
    pub patient_id: Uuid,
    /// Local date.
    pub appointment_date: NaiveDate,
    /// Local time.
    pub appointment_time: NaiveTime,
    /// Visit type, e.g. `follow_up`.
    pub appointment_type: Option<String>,
    /// Attending doctor.
    pub doctor_name: Option<String>,
    /// Clinic or room.
    pub location: Option<String>,
    /// Status, as stored.
    pub appointment_status: String,
}
