//! Location reporting and reminder management.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use gtms_core::config::{LocationConfig, Locale};
use gtms_core::error::AppError;
use gtms_database::store::LocationStore;
use gtms_entity::display::{reminder_type_label, trigger_type_label};
use gtms_entity::location::{
    Coordinate, LocationReminder, NewLocationReminder, NewUserLocation, TriggerMode,
};

use super::evaluator::{FiredReminder, LocationEvaluator};
use crate::context::RequestContext;

/// Validated input for a new location reminder.
#[derive(Debug, Clone)]
pub struct NewReminderInput {
    pub location_name: String,
    pub centre: Coordinate,
    pub radius_meters: Option<f64>,
    pub reminder_type: String,
    pub reminder_message: String,
    pub trigger: Option<TriggerMode>,
}

/// A location reminder with its display labels.
#[derive(Debug, Clone, Serialize)]
pub struct LocationReminderView {
    #[serde(flatten)]
    pub reminder: LocationReminder,
    pub reminder_type_display: String,
    pub trigger_type_display: String,
}

fn unavailable(err: AppError) -> AppError {
    if err.is_schema_missing() {
        AppError::service_unavailable("Location features are not available")
            .with_code("FEATURE_NOT_AVAILABLE")
    } else {
        err
    }
}

/// Records positions and manages the caller's geofences.
#[derive(Debug, Clone)]
pub struct LocationService {
    locations: Arc<dyn LocationStore>,
    evaluator: Arc<LocationEvaluator>,
    config: Arc<LocationConfig>,
    locale: Locale,
}

impl LocationService {
    /// Creates a new location service.
    pub fn new(
        locations: Arc<dyn LocationStore>,
        evaluator: Arc<LocationEvaluator>,
        config: Arc<LocationConfig>,
        locale: Locale,
    ) -> Self {
        Self {
            locations,
            evaluator,
            config,
            locale,
        }
    }

    /// Store a reported position, then evaluate it against the caller's
    /// active reminders.
    pub async fn report(
        &self,
        ctx: &RequestContext,
        coordinate: Coordinate,
        accuracy: Option<f64>,
        address: Option<String>,
    ) -> Result<Vec<FiredReminder>, AppError> {
        self.locations
            .record_location(&NewUserLocation {
                user_id: ctx.user_id,
                coordinate,
                accuracy,
                address,
            })
            .await
            .map_err(unavailable)?;
        Ok(self.evaluator.evaluate(ctx.user_id, coordinate).await)
    }

    /// Create a reminder owned by the caller.
    pub async fn create_reminder(
        &self,
        ctx: &RequestContext,
        input: NewReminderInput,
    ) -> Result<Uuid, AppError> {
        let radius = input
            .radius_meters
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(self.config.default_radius_meters);
        let id = self
            .locations
            .insert_reminder(&NewLocationReminder {
                user_id: ctx.user_id,
                location_name: input.location_name,
                centre: input.centre,
                radius_meters: radius,
                reminder_type: input.reminder_type,
                reminder_message: input.reminder_message,
                trigger: input.trigger.unwrap_or_default(),
            })
            .await
            .map_err(unavailable)?;
        tracing::info!(user_id = %ctx.user_id, reminder_id = %id, radius, "Location reminder created");
        Ok(id)
    }

    /// The caller's active reminders.
    pub async fn list_reminders(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<LocationReminderView>, AppError> {
        let rows = self
            .locations
            .active_reminders(ctx.user_id)
            .await
            .map_err(unavailable)?;
        Ok(rows
            .into_iter()
            .map(|r| LocationReminderView {
                reminder_type_display: reminder_type_label(&r.reminder_type, self.locale),
                trigger_type_display: trigger_type_label(&r.trigger_type, self.locale),
                reminder: r,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtms_core::config::{PushConfig, RefirePolicy};
    use gtms_core::error::ErrorKind;
    use gtms_database::MemoryRecordStore;
    use gtms_push::DeliveryDispatcher;

    use crate::notification::NotificationFactory;

    fn service(store: Arc<MemoryRecordStore>) -> LocationService {
        let dispatcher = DeliveryDispatcher::new(
            store.clone(),
            store.clone(),
            store.clone(),
            None,
            Arc::new(PushConfig::default()),
        );
        let factory = Arc::new(NotificationFactory::new(store.clone(), store.clone(), Arc::new(dispatcher)));
        let evaluator = Arc::new(LocationEvaluator::new(store.clone(), factory, RefirePolicy::Always));
        LocationService::new(store, evaluator, Arc::new(LocationConfig::default()), Locale::Th)
    }

    fn input() -> NewReminderInput {
        NewReminderInput {
            location_name: "Clinic".into(),
            centre: Coordinate::new(13.0, 100.0).unwrap(),
            radius_meters: None,
            reminder_type: "appointment".into(),
            reminder_message: "Bring your IOP log".into(),
            trigger: None,
        }
    }

    #[tokio::test]
    async fn test_reminder_defaults_and_labels() {
        let store = Arc::new(MemoryRecordStore::new());
        let svc = service(store.clone());
        let ctx = RequestContext::new(Uuid::new_v4(), "patient");
        svc.create_reminder(&ctx, input()).await.unwrap();

        let rows = svc.list_reminders(&ctx).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reminder.radius_meters, 100.0);
        assert_eq!(rows[0].reminder.trigger_type, "enter");
        assert_eq!(rows[0].reminder_type_display, "เตือนการนัดหมาย");
        assert_eq!(rows[0].trigger_type_display, "เมื่อเข้าสถานที่");
    }

    #[tokio::test]
    async fn test_report_records_and_fires() {
        let store = Arc::new(MemoryRecordStore::new());
        let svc = service(store.clone());
        let ctx = RequestContext::new(Uuid::new_v4(), "patient");
        svc.create_reminder(&ctx, input()).await.unwrap();

        let fired = svc
            .report(&ctx, Coordinate::new(13.0, 100.0).unwrap(), Some(5.0), None)
            .await
            .unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(store.recorded_locations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unprovisioned_tables_report_feature_unavailable() {
        let svc = service(Arc::new(MemoryRecordStore::new().without_location_tables()));
        let ctx = RequestContext::new(Uuid::new_v4(), "patient");
        let err = svc
            .report(&ctx, Coordinate::new(13.0, 100.0).unwrap(), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
        assert_eq!(err.code, Some("FEATURE_NOT_AVAILABLE"));
    }
}
