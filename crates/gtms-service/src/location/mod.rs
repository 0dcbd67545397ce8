//! Geofenced reminders.

pub mod evaluator;
pub mod geo;
pub mod service;

pub use evaluator::{FiredReminder, LocationEvaluator};
pub use service::{LocationReminderView, LocationService, NewReminderInput};
