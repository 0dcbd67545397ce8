//! Scheduled check configuration.

use chrono::{FixedOffset, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Cadences and clinical thresholds for the background checks.
///
/// Cron expressions use the six-field form (with seconds) and are
/// evaluated in the fixed offset given by `utc_offset_minutes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the cron scheduler starts with the server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local offset from UTC, in minutes, used for "today" and "now".
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    /// High-IOP scan cadence.
    #[serde(default = "default_high_iop_cron")]
    pub high_iop_cron: String,
    /// Missed-medication scan cadence.
    #[serde(default = "default_missed_medication_cron")]
    pub missed_medication_cron: String,
    /// Low-inventory scan cadence.
    #[serde(default = "default_low_inventory_cron")]
    pub low_inventory_cron: String,
    /// Upcoming-appointment scan cadence.
    #[serde(default = "default_appointment_cron")]
    pub appointment_cron: String,
    /// Pressure above which a measurement raises an alert, in mmHg.
    #[serde(default = "default_iop_threshold")]
    pub iop_threshold_mmhg: f64,
    /// Minutes after the scheduled time before a dose counts as missed.
    #[serde(default = "default_grace_minutes")]
    pub missed_grace_minutes: i64,
    /// Days ahead of the expected end date that trigger a refill notice.
    #[serde(default = "default_lookahead_days")]
    pub inventory_lookahead_days: i64,
    /// Start of the same-day appointment window (inclusive).
    #[serde(default = "default_window_start")]
    pub appointment_window_start: NaiveTime,
    /// End of the same-day appointment window (inclusive).
    #[serde(default = "default_window_end")]
    pub appointment_window_end: NaiveTime,
}

impl SchedulerConfig {
    /// The configured offset, or UTC when out of range.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            utc_offset_minutes: default_utc_offset(),
            high_iop_cron: default_high_iop_cron(),
            missed_medication_cron: default_missed_medication_cron(),
            low_inventory_cron: default_low_inventory_cron(),
            appointment_cron: default_appointment_cron(),
            iop_threshold_mmhg: default_iop_threshold(),
            missed_grace_minutes: default_grace_minutes(),
            inventory_lookahead_days: default_lookahead_days(),
            appointment_window_start: default_window_start(),
            appointment_window_end: default_window_end(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_utc_offset() -> i32 {
    7 * 60
}

fn default_high_iop_cron() -> String {
    "0 0 8,12,18 * * *".to_string()
}

fn default_missed_medication_cron() -> String {
    "0 */15 * * * *".to_string()
}

fn default_low_inventory_cron() -> String {
    "0 0 9 * * *".to_string()
}

fn default_appointment_cron() -> String {
    "0 0 9,18 * * *".to_string()
}

fn default_iop_threshold() -> f64 {
    21.0
}

fn default_grace_minutes() -> i64 {
    15
}

fn default_lookahead_days() -> i64 {
    3
}

fn default_window_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()
}

fn default_window_end() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}
