//! High intraocular pressure scan.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use gtms_core::config::Locale;
use gtms_database::store::{AlertStore, ClinicalStore};
use gtms_entity::alert::{AlertSeverity, AlertType, NewAlert};
use gtms_entity::notification::{EntityRef, NotificationKind, NotificationPriority};
use gtms_service::message;
use gtms_service::notification::{NotificationFactory, NotificationRequest};

use super::{CheckError, CheckOutcome, ScheduledCheck};

/// Alerts on today's readings above the clinical threshold.
#[derive(Debug)]
pub struct HighIopCheck {
    clinical: Arc<dyn ClinicalStore>,
    alerts: Arc<dyn AlertStore>,
    factory: Arc<NotificationFactory>,
    threshold: f64,
    locale: Locale,
}

impl HighIopCheck {
    pub fn new(
        clinical: Arc<dyn ClinicalStore>,
        alerts: Arc<dyn AlertStore>,
        factory: Arc<NotificationFactory>,
        threshold: f64,
        locale: Locale,
    ) -> Self {
        Self {
            clinical,
            alerts,
            factory,
            threshold,
            locale,
        }
    }
}

#[async_trait]
impl ScheduledCheck for HighIopCheck {
    fn name(&self) -> &'static str {
        "high_iop"
    }

    async fn run(&self, now: NaiveDateTime) -> Result<CheckOutcome, CheckError> {
        let rows = self.clinical.iop_measurements_on(now.date()).await?;
        let mut outcome = CheckOutcome {
            scanned: rows.len() as u32,
            ..Default::default()
        };

        for m in rows.iter().filter(|m| m.exceeds(self.threshold)) {
            let entity = EntityRef::new("iop_measurement", m.id);

            let alert = NewAlert {
                patient_id: m.patient_id,
                alert_type: AlertType::HighIop,
                severity: AlertSeverity::High,
                message: message::high_iop_alert(m.left_eye_iop, m.right_eye_iop),
                related_entity: Some(entity.clone()),
            };
            let alert_ok = match self.alerts.insert(&alert).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::error!(measurement_id = %m.id, error = %e, "Failed to create high IOP alert");
                    false
                }
            };

            let text = message::high_iop(self.locale, m.left_eye_iop, m.right_eye_iop);
            let request = NotificationRequest::new(
                m.patient_id,
                NotificationKind::HealthAlert,
                text.title,
                text.body,
                NotificationPriority::High,
            )
            .entity(&entity.entity_type, &entity.entity_id)
            .action_url("/iop-measurements")
            .metadata(serde_json::json!({
                "measurement_id": m.id,
                "left_eye_iop": m.left_eye_iop,
                "right_eye_iop": m.right_eye_iop,
            }));

            let created = self.factory.create(request).await.is_some();
            if created {
                outcome.created += 1;
            }
            if !(alert_ok && created) {
                outcome.failures += 1;
            }
        }
        Ok(outcome)
    }
}
