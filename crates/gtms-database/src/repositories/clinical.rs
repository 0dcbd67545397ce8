//! Clinical read repository used by the scheduled checks.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use gtms_core::result::AppResult;
use gtms_entity::clinical::{Appointment, AppointmentStatus, IopMeasurement};
use gtms_entity::medication::{InventoryRow, MedicationReminder, UsageStatus};

use crate::error::db_error;
use crate::store::ClinicalStore;

/// Read-only repository over the patient clinical tables.
#[derive(Debug, Clone)]
pub struct ClinicalRepository {
    pool: PgPool,
}

impl ClinicalRepository {
    /// Create a new clinical repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClinicalStore for ClinicalRepository {
    async fn iop_measurements_on(&self, date: NaiveDate) -> AppResult<Vec<IopMeasurement>> {
        sqlx::query_as::<_, IopMeasurement>(
            "SELECT id, patient_id, measurement_date, measurement_time, left_eye_iop, \
                    right_eye_iop \
             FROM iop_measurements WHERE measurement_date = $1 \
             ORDER BY measurement_time NULLS LAST, id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read IOP measurements", e))
    }

    async fn active_reminders_with_schedule(&self) -> AppResult<Vec<MedicationReminder>> {
        sqlx::query_as::<_, MedicationReminder>(
            "SELECT r.id, r.patient_id, r.prescription_id, r.medication_id, \
                    m.name AS medication_name, r.reminder_time, r.days_of_week, r.start_date, \
                    r.end_date, r.eye, r.dose, r.channels, r.is_active \
             FROM medication_reminders r \
             JOIN medications m ON m.id = r.medication_id \
             WHERE r.is_active = TRUE \
             ORDER BY r.reminder_time, r.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read medication reminders", e))
    }

    async fn has_taken_record(&self, reminder_id: Uuid, date: NaiveDate) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM medication_usage_records \
                            WHERE reminder_id = $1 AND scheduled_time::date = $2 \
                              AND status = $3)",
        )
        .bind(reminder_id)
        .bind(date)
        .bind(UsageStatus::Taken.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check usage records", e))
    }

    async fn inventory_ending_by(&self, date: NaiveDate) -> AppResult<Vec<InventoryRow>> {
        sqlx::query_as::<_, InventoryRow>(
            "SELECT i.id, i.patient_id, i.medication_id, m.name AS medication_name, \
                    i.expected_end_date, i.is_depleted \
             FROM medication_inventory i \
             JOIN medications m ON m.id = i.medication_id \
             WHERE i.is_depleted = FALSE AND i.expected_end_date <= $1 \
             ORDER BY i.expected_end_date, i.id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read medication inventory", e))
    }

    async fn scheduled_appointments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<Appointment>> {
        sqlx::query_as::<_, Appointment>(
            "SELECT id, patient_id, appointment_date, appointment_time, appointment_type, \
                    doctor_name, location, appointment_status \
             FROM appointments \
             WHERE appointment_status = $1 AND appointment_date BETWEEN $2 AND $3 \
             ORDER BY appointment_date, appointment_time, id",
        )
        .bind(AppointmentStatus::Scheduled.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read appointments", e))
    }
}
