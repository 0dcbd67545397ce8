//! Alert entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::notification::EntityRef;

/// Clinical alert category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Pressure above the clinical threshold.
    HighIop,
    /// A dose was not taken in time.
    MissedMedication,
    /// An appointment was not attended.
    AppointmentMissed,
    /// General treatment concern.
    TreatmentConcern,
}

impl AlertType {
    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighIop => "high_iop",
            Self::MissedMedication => "missed_medication",
            Self::AppointmentMissed => "appointment_missed",
            Self::TreatmentConcern => "treatment_concern",
        }
    }
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Low.
    Low,
    /// Medium.
    Medium,
    /// High.
    High,
    /// Critical.
    Critical,
}

impl AlertSeverity {
    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Resolution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Awaiting review.
    Pending,
    /// Closed by staff.
    Resolved,
}

impl AlertStatus {
    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

/// A stored alert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    /// Alert identifier.
    pub id: Uuid,
    /// Patient the alert concerns.
    pub patient_id: Uuid,
    /// Alert type, as stored.
    pub alert_type: String,
    /// Severity, as stored.
    pub severity: String,
    /// Human-readable message.
    pub message: String,
    /// Related entity type.
    pub related_entity_type: Option<String>,
    /// Related entity identifier.
    pub related_entity_id: Option<String>,
    /// Resolution status, as stored.
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Data for inserting an alert. Alerts always start pending.
#[derive(Debug, Clone)]
pub struct NewAlert {
    /// Patient.
    pub patient_id: Uuid,
    /// Type.
    pub alert_type: AlertType,
    /// Severity.
    pub severity: AlertSeverity,
    /// Message.
    pub message: String,
    /// Cross-reference.
    pub related_entity: Option<EntityRef>,
}
