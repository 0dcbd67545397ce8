//! Location reminder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::coordinate::Coordinate;

/// Which boundary crossing fires a reminder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Fire on arrival.
    #[default]
    Enter,
    /// Fire on departure.
    Exit,
    /// Fire on either.
    Both,
}

impl TriggerMode {
    /// Parse a stored value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enter" => Some(Self::Enter),
            "exit" => Some(Self::Exit),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::Both => "both",
        }
    }
}

/// A geofence reminder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LocationReminder {
    /// Reminder identifier.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Human label, e.g. "Home".
    pub location_name: String,
    /// Centre latitude.
    pub latitude: f64,
    /// Centre longitude.
    pub longitude: f64,
    /// Trigger radius in metres.
    pub radius_meters: f64,
    /// Reminder category (`medication`, `appointment`, `general`, ...).
    pub reminder_type: String,
    /// Text shown when the reminder fires.
    pub reminder_message: String,
    /// Trigger mode, as stored.
    pub trigger_type: String,
    /// Whether the reminder is evaluated.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update (touched on every fire).
    pub updated_at: DateTime<Utc>,
}

impl LocationReminder {
    /// Centre of the geofence.
    pub fn centre(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Parsed trigger mode, defaulting to `enter`.
    pub fn trigger_mode(&self) -> TriggerMode {
        TriggerMode::parse(&self.trigger_type).unwrap_or_default()
    }
}

/// Data for inserting a location reminder.
#[derive(Debug, Clone)]
pub struct NewLocationReminder {
    /// Owner.
    pub user_id: Uuid,
    /// Label.
    pub location_name: String,
    /// Centre.
    pub centre: Coordinate,
    /// Radius in metres.
    pub radius_meters: f64,
    /// Category.
    pub reminder_type: String,
    /// Message.
    pub reminder_message: String,
    /// Trigger mode.
    pub trigger: TriggerMode,
}

/// A reported position.
#[derive(Debug, Clone)]
pub struct NewUserLocation {
    /// Reporter.
    pub user_id: Uuid,
    /// Position.
    pub coordinate: Coordinate,
    /// Reported accuracy in metres.
    pub accuracy: Option<f64>,
    /// Reverse-geocoded address, if the client sent one.
    pub address: Option<String>,
}
