//! Medication usage records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Outcome of one scheduled dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageStatus {
    /// Taken.
    Taken,
    /// Deliberately skipped.
    Skipped,
    /// Taken late.
    Delayed,
}

impl UsageStatus {
    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taken => "taken",
            Self::Skipped => "skipped",
            Self::Delayed => "delayed",
        }
    }
}

/// A recorded dose outcome. Times are local wall-clock times.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Reminder occurrence this record answers.
    pub reminder_id: Uuid,
    /// Patient.
    pub patient_id: Uuid,
    /// When the dose was due.
    pub scheduled_time: NaiveDateTime,
    /// When the dose was actually taken.
    pub actual_time: Option<NaiveDateTime>,
    /// Outcome, as stored.
    pub status: String,
}

impl UsageRecord {
    /// Whether this record marks `reminder_id` as taken on `date`. The
    /// missed-medication scan treats the absence of any such record as
    /// a missed dose.
    pub fn is_taken_on(&self, reminder_id: Uuid, date: NaiveDate) -> bool {
        self.reminder_id == reminder_id
            && self.scheduled_time.date() == date
            && self.status == UsageStatus::Taken.as_str()
    }
}
