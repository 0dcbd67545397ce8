//! Clinical records read by the scheduled checks.

pub mod appointment;
pub mod iop;

pub use appointment::{Appointment, AppointmentStatus};
pub use iop::IopMeasurement;
