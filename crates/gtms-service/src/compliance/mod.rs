//! Adherence scoring over medication, appointment and notification history.

pub mod engine;
pub mod recommendations;

pub use engine::{
    AppointmentCompliance, ComplianceEngine, ComplianceHistoryView, ComplianceReportView,
    MedicationCompliance, NotificationCompliance, OverallMedicationCompliance,
};
pub use recommendations::{Recommendation, recommend};
