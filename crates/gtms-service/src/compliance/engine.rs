//! Compliance report builder.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use gtms_core::config::Locale;
use gtms_core::error::AppError;
use gtms_database::store::ComplianceStore;
use gtms_entity::compliance::{
    AppointmentCounts, ComplianceGrade, ComplianceHistoryRow, MedicationUsageRow,
    NewComplianceReport, NotificationReadStats, ReportType,
};

use super::recommendations::{Recommendation, recommend};
use crate::notification::service::{percentage, round2};

/// Longest period a report may cover, in days.
pub const MAX_PERIOD_DAYS: i64 = 365;
/// History rows returned when the caller gives no limit.
pub const DEFAULT_HISTORY_LIMIT: u32 = 12;
const MAX_HISTORY_LIMIT: u32 = 100;

/// Adherence for one medication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationCompliance {
    pub medication_id: Uuid,
    pub medication_name: String,
    pub days_with_records: i64,
    pub total_doses: i64,
    pub taken: i64,
    pub skipped: i64,
    pub delayed: i64,
    pub compliance_rate: f64,
    pub avg_delay_minutes: Option<f64>,
    pub grade: ComplianceGrade,
}

impl From<MedicationUsageRow> for MedicationCompliance {
    fn from(row: MedicationUsageRow) -> Self {
        let rate = percentage(row.taken, row.total);
        Self {
            medication_id: row.medication_id,
            medication_name: row.medication_name,
            days_with_records: row.days_with_records,
            total_doses: row.total,
            taken: row.taken,
            skipped: row.skipped,
            delayed: row.delayed,
            compliance_rate: rate,
            avg_delay_minutes: row.avg_delay_minutes.map(round2),
            grade: ComplianceGrade::from_rate(rate),
        }
    }
}

/// Adherence summed over every medication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMedicationCompliance {
    pub total_reminders: i64,
    pub total_taken: i64,
    pub compliance_rate: f64,
    pub grade: ComplianceGrade,
}

impl OverallMedicationCompliance {
    fn from_rows(rows: &[MedicationCompliance]) -> Self {
        let total_reminders = rows.iter().map(|r| r.total_doses).sum();
        let total_taken = rows.iter().map(|r| r.taken).sum();
        let rate = percentage(total_taken, total_reminders);
        Self {
            total_reminders,
            total_taken,
            compliance_rate: rate,
            grade: ComplianceGrade::from_rate(rate),
        }
    }
}

/// Appointment attendance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentCompliance {
    pub total_appointments: i64,
    pub attended: i64,
    pub missed: i64,
    pub cancelled: i64,
    pub rescheduled: i64,
    pub attendance_rate: f64,
}

impl From<AppointmentCounts> for AppointmentCompliance {
    fn from(c: AppointmentCounts) -> Self {
        Self {
            total_appointments: c.total,
            attended: c.attended,
            missed: c.missed,
            cancelled: c.cancelled,
            rescheduled: c.rescheduled,
            attendance_rate: percentage(c.attended, c.total),
        }
    }
}

/// Read engagement for one notification type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationCompliance {
    pub notification_type: String,
    pub total_notifications: i64,
    pub read_count: i64,
    pub avg_response_time_minutes: Option<f64>,
    pub read_rate: f64,
}

impl From<NotificationReadStats> for NotificationCompliance {
    fn from(s: NotificationReadStats) -> Self {
        Self {
            read_rate: percentage(s.read_count, s.total),
            avg_response_time_minutes: s.avg_response_minutes.map(round2),
            notification_type: s.notification_type,
            total_notifications: s.total,
            read_count: s.read_count,
        }
    }
}

/// A computed compliance report.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReportView {
    pub patient_id: Uuid,
    pub report_type: ReportType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub period_days: i64,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_compliance: Option<Vec<MedicationCompliance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_medication_compliance: Option<OverallMedicationCompliance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_compliance: Option<AppointmentCompliance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_compliance: Option<Vec<NotificationCompliance>>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Uuid>,
}

/// A stored snapshot as listed in the history.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceHistoryView {
    pub id: Uuid,
    pub report_type: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub period_days: i64,
    pub compliance_rate: f64,
    pub grade: String,
    pub generated_at: DateTime<Utc>,
}

impl From<ComplianceHistoryRow> for ComplianceHistoryView {
    fn from(row: ComplianceHistoryRow) -> Self {
        Self {
            period_days: row.period_days(),
            id: row.id,
            report_type: row.report_type,
            period_start: row.period_start,
            period_end: row.period_end,
            compliance_rate: row.compliance_rate,
            grade: row.grade,
            generated_at: row.generated_at,
        }
    }
}

fn report_error(err: AppError) -> AppError {
    tracing::error!(error = %err, "Compliance report failed");
    err.with_code("REPORT_ERROR")
}

/// Builds compliance reports and persists overall snapshots.
#[derive(Debug, Clone)]
pub struct ComplianceEngine {
    store: Arc<dyn ComplianceStore>,
    offset: FixedOffset,
    locale: Locale,
}

impl ComplianceEngine {
    /// Creates a new compliance engine.
    pub fn new(store: Arc<dyn ComplianceStore>, offset: FixedOffset, locale: Locale) -> Self {
        Self {
            store,
            offset,
            locale,
        }
    }

    /// Build a report over the last `period_days` days.
    pub async fn build_report(
        &self,
        patient_id: Uuid,
        period_days: i64,
        report_type: ReportType,
    ) -> Result<ComplianceReportView, AppError> {
        self.build_report_at(patient_id, period_days, report_type, Utc::now())
            .await
    }

    /// Build a report ending at `now`.
    pub async fn build_report_at(
        &self,
        patient_id: Uuid,
        period_days: i64,
        report_type: ReportType,
        now: DateTime<Utc>,
    ) -> Result<ComplianceReportView, AppError> {
        if !(1..=MAX_PERIOD_DAYS).contains(&period_days) {
            return Err(AppError::validation(
                "INVALID_PERIOD",
                format!("period must be between 1 and {MAX_PERIOD_DAYS} days"),
            ));
        }

        let span = Duration::days(period_days);
        let local_now = now.with_timezone(&self.offset).naive_local();
        let local_start = local_now - span;

        let mut report = ComplianceReportView {
            patient_id,
            report_type,
            period_start: local_start.date(),
            period_end: local_now.date(),
            period_days,
            generated_at: now,
            medication_compliance: None,
            overall_medication_compliance: None,
            appointment_compliance: None,
            notification_compliance: None,
            recommendations: Vec::new(),
            report_id: None,
        };

        if report_type.includes_medication() {
            let rows: Vec<MedicationCompliance> = self
                .store
                .medication_usage(patient_id, local_start, local_now)
                .await
                .map_err(report_error)?
                .into_iter()
                .map(MedicationCompliance::from)
                .collect();
            report.overall_medication_compliance =
                Some(OverallMedicationCompliance::from_rows(&rows));
            report.medication_compliance = Some(rows);
        }

        if report_type.includes_appointments() {
            let counts = self
                .store
                .appointment_counts(patient_id, report.period_start, report.period_end)
                .await
                .map_err(report_error)?;
            report.appointment_compliance = Some(counts.into());
        }

        if report_type.includes_notifications() {
            let stats = self
                .store
                .notification_read_stats(patient_id, now - span, now)
                .await
                .map_err(report_error)?;
            report.notification_compliance =
                Some(stats.into_iter().map(NotificationCompliance::from).collect());
        }

        report.recommendations = recommend(
            report.overall_medication_compliance.as_ref(),
            report.appointment_compliance.as_ref(),
            self.locale,
        );

        if report_type == ReportType::Overall {
            report.report_id = Some(self.persist(&report).await.map_err(report_error)?);
        }

        tracing::info!(
            patient_id = %patient_id,
            report_type = report_type.as_str(),
            period_days,
            persisted = report.report_id.is_some(),
            "Compliance report built"
        );
        Ok(report)
    }

    async fn persist(&self, report: &ComplianceReportView) -> Result<Uuid, AppError> {
        let overall = report.overall_medication_compliance.clone().unwrap_or(
            OverallMedicationCompliance {
                total_reminders: 0,
                total_taken: 0,
                compliance_rate: 0.0,
                grade: ComplianceGrade::Critical,
            },
        );
        let snapshot = NewComplianceReport {
            id: Uuid::now_v7(),
            patient_id: report.patient_id,
            report_type: report.report_type,
            period_start: report.period_start,
            period_end: report.period_end,
            total_scheduled: overall.total_reminders,
            total_completed: overall.total_taken,
            compliance_rate: overall.compliance_rate,
            grade: overall.grade,
            detailed_data: serde_json::to_value(report)?,
            recommendations: serde_json::to_value(&report.recommendations)?,
            generated_at: report.generated_at,
        };
        self.store.insert_report(&snapshot).await
    }

    /// Stored snapshots, newest first.
    pub async fn history(
        &self,
        patient_id: Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<ComplianceHistoryView>, AppError> {
        let limit = limit
            .filter(|l| (1..=MAX_HISTORY_LIMIT).contains(l))
            .unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(self
            .store
            .report_history(patient_id, limit)
            .await?
            .into_iter()
            .map(ComplianceHistoryView::from)
            .collect())
    }
}
