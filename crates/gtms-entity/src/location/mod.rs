//! Location reminder entities.

pub mod coordinate;
pub mod reminder;

pub use coordinate::Coordinate;
pub use reminder::{LocationReminder, NewLocationReminder, NewUserLocation, TriggerMode};
