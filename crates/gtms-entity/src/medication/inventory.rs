//! Medication inventory rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stock of one medication for one patient.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryRow {
    /// Inventory identifier.
    pub id: Uuid,
    /// Patient.
    pub patient_id: Uuid,
    /// Medication.
    pub medication_id: Uuid,
    /// Medication display name.
    pub medication_name: String,
    /// Date the current supply is expected to run out.
    pub expected_end_date: NaiveDate,
    /// Whether the supply has already run out.
    pub is_depleted: bool,
}

impl InventoryRow {
    /// Whole days of supply left, never negative.
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.expected_end_date - today).num_days().max(0)
    }
}
