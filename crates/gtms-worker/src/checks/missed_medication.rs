//! Missed-dose scan.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};

use gtms_core::config::Locale;
use gtms_database::store::{AlertStore, ClinicalStore};
use gtms_entity::alert::{AlertSeverity, AlertType, NewAlert};
use gtms_entity::medication::MedicationReminder;
use gtms_entity::notification::{EntityRef, NotificationKind, NotificationPriority};
use gtms_service::message;
use gtms_service::notification::{NotificationFactory, NotificationRequest};

use super::{CheckError, CheckOutcome, ScheduledCheck};

/// Flags reminders whose dose is past due with no "taken" record today.
#[derive(Debug)]
pub struct MissedMedicationCheck {
    clinical: Arc<dyn ClinicalStore>,
    alerts: Arc<dyn AlertStore>,
    factory: Arc<NotificationFactory>,
    grace: Duration,
    locale: Locale,
}

impl MissedMedicationCheck {
    pub fn new(
        clinical: Arc<dyn ClinicalStore>,
        alerts: Arc<dyn AlertStore>,
        factory: Arc<NotificationFactory>,
        grace_minutes: i64,
        locale: Locale,
    ) -> Self {
        Self {
            clinical,
            alerts,
            factory,
            grace: Duration::minutes(grace_minutes),
            locale,
        }
    }

    /// Whether `reminder` counts as missed at `now`. Storage errors
    /// propagate so the caller can count the row as failed.
    pub async fn is_missed(
        &self,
        reminder: &MedicationReminder,
        now: NaiveDateTime,
    ) -> Result<bool, CheckError> {
        let today = now.date();
        if !reminder.is_scheduled_on(today) || !reminder.is_overdue(now, self.grace) {
            return Ok(false);
        }
        Ok(!self.clinical.has_taken_record(reminder.id, today).await?)
    }

    async fn notify(&self, r: &MedicationReminder) -> bool {
        let entity = EntityRef::new("medication_reminder", r.id);
        let alert = NewAlert {
            patient_id: r.patient_id,
            alert_type: AlertType::MissedMedication,
            severity: AlertSeverity::Medium,
            message: message::missed_medication_alert(&r.medication_name, r.reminder_time),
            related_entity: Some(entity.clone()),
        };
        let alert_ok = match self.alerts.insert(&alert).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(reminder_id = %r.id, error = %e, "Failed to create missed medication alert");
                false
            }
        };

        let text = message::missed_medication(self.locale, &r.medication_name, r.reminder_time);
        let request = NotificationRequest::new(
            r.patient_id,
            NotificationKind::MedicationReminder,
            text.title,
            text.body,
            NotificationPriority::High,
        )
        .entity(&entity.entity_type, &entity.entity_id)
        .action_url("/medication-tracker")
        .metadata(serde_json::json!({
            "reminder_id": r.id,
            "medication_name": r.medication_name,
            "scheduled_time": r.reminder_time.format("%H:%M:%S").to_string(),
        }));
        let created = self.factory.create(request).await.is_some();
        alert_ok && created
    }
}

#[async_trait]
impl ScheduledCheck for MissedMedicationCheck {
    fn name(&self) -> &'static str {
        "missed_medication"
    }

    async fn run(&self, now: NaiveDateTime) -> Result<CheckOutcome, CheckError> {
        let reminders = self.clinical.active_reminders_with_schedule().await?;
        let mut outcome = CheckOutcome::default();

        for r in &reminders {
            outcome.scanned += 1;
            match self.is_missed(r, now).await {
                Ok(false) => {}
                Ok(true) => {
                    if self.notify(r).await {
                        outcome.created += 1;
                    } else {
                        outcome.failures += 1;
                    }
                }
                Err(e) => {
                    tracing::error!(reminder_id = %r.id, error = %e, "Failed to check usage records");
                    outcome.failures += 1;
                }
            }
        }
        Ok(outcome)
    }
}
