//! Compliance aggregate and report repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gtms_core::result::AppResult;
use gtms_entity::compliance::{
    AppointmentCounts, ComplianceHistoryRow, MedicationUsageRow, NewComplianceReport,
    NotificationReadStats,
};

use crate::error::db_error;
use crate::store::ComplianceStore;

/// Repository for compliance aggregates and snapshots.
#[derive(Debug, Clone)]
pub struct ComplianceRepository {
    pool: PgPool,
}

impl ComplianceRepository {
    /// Create a new compliance repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ComplianceStore for ComplianceRepository {
    async fn medication_usage(
        &self,
        patient_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<MedicationUsageRow>> {
        sqlx::query_as::<_, MedicationUsageRow>(
            "SELECT r.medication_id, m.name AS medication_name, \
                    COUNT(DISTINCT u.scheduled_time::date) AS days_with_records, \
                    COUNT(u.id) AS total, \
                    COUNT(u.id) FILTER (WHERE u.status = 'taken') AS taken, \
                    COUNT(u.id) FILTER (WHERE u.status = 'skipped') AS skipped, \
                    COUNT(u.id) FILTER (WHERE u.status = 'delayed') AS delayed, \
                    (AVG(EXTRACT(EPOCH FROM (u.actual_time - u.scheduled_time)) / 60.0) \
                        FILTER (WHERE u.status = 'delayed' AND u.actual_time IS NOT NULL)\
                    )::float8 AS avg_delay_minutes \
             FROM medication_reminders r \
             JOIN medications m ON m.id = r.medication_id \
             LEFT JOIN medication_usage_records u ON u.reminder_id = r.id \
                  AND u.scheduled_time >= $2 AND u.scheduled_time <= $3 \
             WHERE r.patient_id = $1 AND r.is_active = TRUE \
             GROUP BY r.medication_id, m.name \
             ORDER BY m.name",
        )
        .bind(patient_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to aggregate medication usage", e))
    }

    async fn appointment_counts(
        &self,
        patient_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<AppointmentCounts> {
        sqlx::query_as::<_, AppointmentCounts>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE appointment_status = 'completed') AS attended, \
                    COUNT(*) FILTER (WHERE appointment_status = 'no_show') AS missed, \
                    COUNT(*) FILTER (WHERE appointment_status = 'cancelled') AS cancelled, \
                    COUNT(*) FILTER (WHERE appointment_status = 'rescheduled') AS rescheduled \
             FROM appointments \
             WHERE patient_id = $1 AND appointment_date >= $2 AND appointment_date <= $3",
        )
        .bind(patient_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to aggregate appointments", e))
    }

    async fn notification_read_stats(
        &self,
        patient_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<NotificationReadStats>> {
        sqlx::query_as::<_, NotificationReadStats>(
            "SELECT notification_type, \
                    COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE is_read) AS read_count, \
                    (AVG(EXTRACT(EPOCH FROM (read_at - created_at)) / 60.0) \
                        FILTER (WHERE read_at IS NOT NULL))::float8 AS avg_response_minutes \
             FROM notifications \
             WHERE user_id = $1 AND created_at >= $2 AND created_at <= $3 \
             GROUP BY notification_type \
             ORDER BY notification_type",
        )
        .bind(patient_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to aggregate notification reads", e))
    }

    async fn insert_report(&self, report: &NewComplianceReport) -> AppResult<Uuid> {
        sqlx::query(
            "INSERT INTO compliance_reports \
             (id, patient_id, report_type, period_start, period_end, total_scheduled, \
              total_completed, total_missed, compliance_rate, grade, detailed_data, \
              recommendations, generated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(report.id)
        .bind(report.patient_id)
        .bind(report.report_type.as_str())
        .bind(report.period_start)
        .bind(report.period_end)
        .bind(report.total_scheduled)
        .bind(report.total_completed)
        .bind(report.total_scheduled - report.total_completed)
        .bind(report.compliance_rate)
        .bind(report.grade.as_str())
        .bind(report.detailed_data.clone())
        .bind(report.recommendations.clone())
        .bind(report.generated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save compliance report", e))?;
        Ok(report.id)
    }

    async fn report_history(
        &self,
        patient_id: Uuid,
        limit: u32,
    ) -> AppResult<Vec<ComplianceHistoryRow>> {
        sqlx::query_as::<_, ComplianceHistoryRow>(
            "SELECT id, report_type, period_start, period_end, compliance_rate, grade, \
                    generated_at \
             FROM compliance_reports WHERE patient_id = $1 \
             ORDER BY generated_at DESC LIMIT $2",
        )
        .bind(patient_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list compliance reports", e))
    }
}
