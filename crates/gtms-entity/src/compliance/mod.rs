//! Compliance aggregates and report snapshots.

pub mod aggregate;
pub mod report;

pub use aggregate::{AppointmentCounts, MedicationUsageRow, NotificationReadStats};
pub use report::{ComplianceGrade, ComplianceHistoryRow, ComplianceReport, NewComplianceReport, ReportType};
