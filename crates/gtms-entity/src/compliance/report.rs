//! Compliance report snapshot model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Which sections a report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// All sections; persisted as a snapshot.
    #[default]
    Overall,
    /// Medication only.
    Medication,
    /// Appointments only.
    Appointment,
    /// Notification responsiveness only.
    Notification,
}

impl ReportType {
    /// Parse a query value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "overall" => Some(Self::Overall),
            "medication" => Some(Self::Medication),
            "appointment" => Some(Self::Appointment),
            "notification" => Some(Self::Notification),
            _ => None,
        }
    }

    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overall => "overall",
            Self::Medication => "medication",
            Self::Appointment => "appointment",
            Self::Notification => "notification",
        }
    }

    /// Whether the medication section is included.
    pub fn includes_medication(&self) -> bool {
        matches!(self, Self::Overall | Self::Medication)
    }

    /// Whether the appointment section is included.
    pub fn includes_appointments(&self) -> bool {
        matches!(self, Self::Overall | Self::Appointment)
    }

    /// Whether the notification section is included.
    pub fn includes_notifications(&self) -> bool {
        matches!(self, Self::Overall | Self::Notification)
    }
}

/// Letter-style grade for a compliance rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceGrade {
    /// 95 and above.
    Excellent,
    /// 80 up to 95.
    Good,
    /// 60 up to 80.
    Fair,
    /// 40 up to 60.
    Poor,
    /// Below 40.
    Critical,
}

impl ComplianceGrade {
    /// Grade a percentage. Lower bounds are inclusive.
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            Self::Excellent
        } else if rate >= 80.0 {
            Self::Good
        } else if rate >= 60.0 {
            Self::Fair
        } else if rate >= 40.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Critical => "critical",
        }
    }
}

/// A persisted report snapshot. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ComplianceReport {
    /// Report identifier.
    pub id: Uuid,
    /// Patient.
    pub patient_id: Uuid,
    /// Report type, as stored.
    pub report_type: String,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Scheduled doses.
    pub total_scheduled: i64,
    /// Doses taken.
    pub total_completed: i64,
    /// Scheduled minus taken.
    pub total_missed: i64,
    /// Overall medication compliance.
    pub compliance_rate: f64,
    /// Grade, as stored.
    pub grade: String,
    /// Full report document.
    pub detailed_data: serde_json::Value,
    /// Recommendation list.
    pub recommendations: serde_json::Value,
    /// When the snapshot was written.
    pub generated_at: DateTime<Utc>,
}

/// Data for inserting a snapshot.
#[derive(Debug, Clone)]
pub struct NewComplianceReport {
    /// Identifier assigned before insert.
    pub id: Uuid,
    /// Patient.
    pub patient_id: Uuid,
    /// Report type.
    pub report_type: ReportType,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Scheduled doses.
    pub total_scheduled: i64,
    /// Doses taken.
    pub total_completed: i64,
    /// Overall rate.
    pub compliance_rate: f64,
    /// Grade.
    pub grade: ComplianceGrade,
    /// Full report document.
    pub detailed_data: serde_json::Value,
    /// Recommendation list.
    pub recommendations: serde_json::Value,
    /// Generation time.
    pub generated_at: DateTime<Utc>,
}

/// A row in the compliance history listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ComplianceHistoryRow {
    /// Report identifier.
    pub id: Uuid,
    /// Report type.
    pub report_type: String,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Overall rate.
    pub compliance_rate: f64,
    /// Grade.
    pub grade: String,
    /// Generation time.
    pub generated_at: DateTime<Utc>,
}

impl ComplianceHistoryRow {
    /// Days between the period bounds.
    pub fn period_days(&self) -> i64 {
        (self.period_end - self.period_start).num_days()
    }
}
