//! Clinical alert entities.

pub mod model;

pub use model::{Alert, AlertSeverity, AlertStatus, AlertType, NewAlert};
