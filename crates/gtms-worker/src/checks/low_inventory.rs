//! Low medication stock scan.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};

use gtms_core::config::Locale;
use gtms_database::store::ClinicalStore;
use gtms_entity::notification::{NotificationKind, NotificationPriority};
use gtms_service::message;
use gtms_service::notification::{NotificationFactory, NotificationRequest};

use super::{CheckError, CheckOutcome, ScheduledCheck};

/// Warns patients whose stock runs out within the lookahead window.
#[derive(Debug)]
pub struct LowInventoryCheck {
    clinical: Arc<dyn ClinicalStore>,
    factory: Arc<NotificationFactory>,
    lookahead: Duration,
    locale: Locale,
}

impl LowInventoryCheck {
    pub fn new(
        clinical: Arc<dyn ClinicalStore>,
        factory: Arc<NotificationFactory>,
        lookahead_days: i64,
        locale: Locale,
    ) -> Self {
        Self {
            clinical,
            factory,
            lookahead: Duration::days(lookahead_days),
            locale,
        }
    }
}

#[async_trait]
impl ScheduledCheck for LowInventoryCheck {
    fn name(&self) -> &'static str {
        "low_inventory"
    }

    async fn run(&self, now: NaiveDateTime) -> Result<CheckOutcome, CheckError> {
        let today = now.date();
        let rows = self.clinical.inventory_ending_by(today + self.lookahead).await?;
        let mut outcome = CheckOutcome {
            scanned: rows.len() as u32,
            ..Default::default()
        };

        for row in &rows {
            let days_left = row.days_left(today);
            let text = message::low_inventory(self.locale, &row.medication_name, days_left);
            let request = NotificationRequest::new(
                row.patient_id,
                NotificationKind::MedicationInventory,
                text.title,
                text.body,
                NotificationPriority::High,
            )
            .entity("medication_inventory", row.id)
            .action_url("/medication-inventory")
            .metadata(serde_json::json!({
                "inventory_id": row.id,
                "medication_name": row.medication_name,
                "days_left": days_left,
            }));

            if self.factory.create(request).await.is_some() {
                outcome.created += 1;
            } else {
                outcome.failures += 1;
            }
        }
        Ok(outcome)
    }
}
