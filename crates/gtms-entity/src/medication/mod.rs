//! Medication schedule, usage, and inventory entities.

pub mod inventory;
pub mod reminder;
pub mod usage;

pub use inventory::InventoryRow;
pub use reminder::{DaysOfWeek, MedicationReminder};
pub use usage::{UsageRecord, UsageStatus};
