//! Upcoming appointment scan.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, NaiveTime};

use gtms_core::config::Locale;
use gtms_database::store::ClinicalStore;
use gtms_entity::clinical::Appointment;
use gtms_entity::notification::{NotificationKind, NotificationPriority};
use gtms_service::message;
use gtms_service::notification::{NotificationFactory, NotificationRequest};

use super::{CheckError, CheckOutcome, ScheduledCheck};

/// Reminds patients of scheduled appointments today and tomorrow.
///
/// Same-day appointments are only announced while the local time falls
/// inside `[window_start, window_end]`.
#[derive(Debug)]
pub struct AppointmentReminderCheck {
    clinical: Arc<dyn ClinicalStore>,
    factory: Arc<NotificationFactory>,
    window_start: NaiveTime,
    window_end: NaiveTime,
    locale: Locale,
}

impl AppointmentReminderCheck {
    pub fn new(
        clinical: Arc<dyn ClinicalStore>,
        factory: Arc<NotificationFactory>,
        window_start: NaiveTime,
        window_end: NaiveTime,
        locale: Locale,
    ) -> Self {
        Self {
            clinical,
            factory,
            window_start,
            window_end,
            locale,
        }
    }

    fn in_window(&self, time: NaiveTime) -> bool {
        time >= self.window_start && time <= self.window_end
    }

    fn request(&self, a: &Appointment, days_until: i64) -> NotificationRequest {
        let text = message::appointment(
            self.locale,
            days_until,
            a.doctor_name.as_deref(),
            a.appointment_date,
            a.appointment_time,
        );
        let priority = if days_until <= 1 {
            NotificationPriority::High
        } else {
            NotificationPriority::Medium
        };
        NotificationRequest::new(
            a.patient_id,
            NotificationKind::AppointmentReminder,
            text.title,
            text.body,
            priority,
        )
        .entity("appointment", a.id)
        .action_url("/appointments")
        .metadata(serde_json::json!({
            "appointment_id": a.id,
            "appointment_date": a.appointment_date.to_string(),
            "appointment_time": a.appointment_time.format("%H:%M:%S").to_string(),
            "appointment_type": a.appointment_type,
            "doctor_name": a.doctor_name,
            "notification_type": "reminder",
        }))
    }
}

#[async_trait]
impl ScheduledCheck for AppointmentReminderCheck {
    fn name(&self) -> &'static str {
        "appointment_reminder"
    }

    async fn run(&self, now: NaiveDateTime) -> Result<CheckOutcome, CheckError> {
        let today = now.date();
        let rows = self
            .clinical
            .scheduled_appointments_between(today, today + Duration::days(1))
            .await?;
        let mut outcome = CheckOutcome {
            scanned: rows.len() as u32,
            ..Default::default()
        };
        let same_day_allowed = self.in_window(now.time());

        for a in &rows {
            let days_until = (a.appointment_date - today).num_days();
            if days_until == 0 && !same_day_allowed {
                continue;
            }
            if self.factory.create(self.request(a, days_until)).await.is_some() {
                outcome.created += 1;
            } else {
                outcome.failures += 1;
            }
        }
        Ok(outcome)
    }
}
