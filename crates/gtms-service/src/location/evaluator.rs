//! Evaluates reported positions against the user's geofences.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use gtms_core::config::RefirePolicy;
use gtms_database::store::LocationStore;
use gtms_entity::location::{Coordinate, LocationReminder, TriggerMode};
use gtms_entity::notification::{NotificationKind, NotificationPriority};

use super::geo::haversine_meters;
use crate::message;
use crate::notification::{NotificationFactory, NotificationRequest};

/// A reminder that fired for a reported position.
#[derive(Debug, Clone, Serialize)]
pub struct FiredReminder {
    pub reminder_id: Uuid,
    pub location_name: String,
    pub distance_meters: f64,
    pub notification_id: Option<Uuid>,
}

/// Fires location reminders.
///
/// Under [`RefirePolicy::OncePerEntry`] the last known inside/outside
/// state per (user, reminder) is kept in memory and only transitions
/// matching the reminder's trigger mode fire. State for reminders no
/// longer active is dropped on the user's next evaluation.
#[derive(Debug)]
pub struct LocationEvaluator {
    locations: Arc<dyn LocationStore>,
    factory: Arc<NotificationFactory>,
    policy: RefirePolicy,
    inside: DashMap<(Uuid, Uuid), bool>,
}

impl LocationEvaluator {
    /// Creates a new evaluator.
    pub fn new(
        locations: Arc<dyn LocationStore>,
        factory: Arc<NotificationFactory>,
        policy: RefirePolicy,
    ) -> Self {
        Self {
            locations,
            factory,
            policy,
            inside: DashMap::new(),
        }
    }

    /// Evaluate one reported position. Storage problems are logged and
    /// yield no fired reminders.
    pub async fn evaluate(&self, user_id: Uuid, position: Coordinate) -> Vec<FiredReminder> {
        let reminders = match self.locations.active_reminders(user_id).await {
            Ok(r) => r,
            Err(e) if e.is_schema_missing() => {
                tracing::debug!(user_id = %user_id, "Location reminders not provisioned, skipping");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load location reminders");
                return Vec::new();
            }
        };

        if self.policy == RefirePolicy::OncePerEntry {
            self.prune_inactive(user_id, &reminders);
        }

        let mut fired = Vec::new();
        for reminder in reminders {
            let distance = haversine_meters(position, reminder.centre());
            let is_inside = distance <= reminder.radius_meters;
            if !self.should_fire(user_id, &reminder, is_inside) {
                continue;
            }
            fired.push(self.fire(user_id, &reminder, distance).await);
        }
        fired
    }

    fn prune_inactive(&self, user_id: Uuid, active: &[LocationReminder]) {
        let active: HashSet<Uuid> = active.iter().map(|r| r.id).collect();
        self.inside
            .retain(|(user, reminder), _| *user != user_id || active.contains(reminder));
    }

    fn should_fire(&self, user_id: Uuid, reminder: &LocationReminder, is_inside: bool) -> bool {
        match self.policy {
            RefirePolicy::Always => is_inside,
            RefirePolicy::OncePerEntry => {
                let was_inside = self
                    .inside
                    .insert((user_id, reminder.id), is_inside)
                    .unwrap_or(false);
                match reminder.trigger_mode() {
                    TriggerMode::Enter => !was_inside && is_inside,
                    TriggerMode::Exit => was_inside && !is_inside,
                    TriggerMode::Both => was_inside != is_inside,
                }
            }
        }
    }

    async fn fire(&self, user_id: Uuid, reminder: &LocationReminder, distance: f64) -> FiredReminder {
        let text = message::location(&reminder.location_name, &reminder.reminder_message);
        let request = NotificationRequest::new(
            user_id,
            NotificationKind::LocationReminder,
            text.title,
            text.body,
            NotificationPriority::Medium,
        )
        .entity("location_reminder", reminder.id)
        .metadata(serde_json::json!({
            "location_name": reminder.location_name,
            "reminder_type": reminder.reminder_type,
            "distance": distance.round(),
        }));

        let notification_id = self.factory.create(request).await.map(|c| c.notification_id);
        if let Err(e) = self.locations.touch_reminder(reminder.id, Utc::now()).await {
            tracing::warn!(reminder_id = %reminder.id, error = %e, "Failed to touch location reminder");
        }
        tracing::info!(
            user_id = %user_id,
            reminder_id = %reminder.id,
            distance_meters = distance.round(),
            "Location reminder fired"
        );

        FiredReminder {
            reminder_id: reminder.id,
            location_name: reminder.location_name.clone(),
            distance_meters: distance.round(),
            notification_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtms_core::config::PushConfig;
    use gtms_database::MemoryRecordStore;
    use gtms_entity::location::NewLocationReminder;
    use gtms_push::DeliveryDispatcher;

    fn evaluator(store: Arc<MemoryRecordStore>, policy: RefirePolicy) -> LocationEvaluator {
        let dispatcher = DeliveryDispatcher::new(
            store.clone(),
            store.clone(),
            store.clone(),
            None,
            Arc::new(PushConfig::default()),
        );
        let factory = NotificationFactory::new(store.clone(), store.clone(), Arc::new(dispatcher));
        LocationEvaluator::new(store, Arc::new(factory), policy)
    }

    async fn reminder(store: &MemoryRecordStore, user: Uuid, trigger: TriggerMode) -> Uuid {
        store
            .insert_reminder(&NewLocationReminder {
                user_id: user,
                location_name: "Pharmacy".into(),
                centre: Coordinate::new(13.0, 100.0).unwrap(),
                radius_meters: 100.0,
                reminder_type: "medication".into(),
                reminder_message: "Pick up your eye drops".into(),
                trigger,
            })
            .await
            .unwrap()
    }

    fn here() -> Coordinate {
        Coordinate::new(13.0, 100.0).unwrap()
    }

    // About 500 m north of the reminder centre.
    fn away() -> Coordinate {
        Coordinate::new(13.0045, 100.0).unwrap()
    }

    #[tokio::test]
    async fn test_fires_inside_radius_only() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        reminder(&store, user, TriggerMode::Enter).await;
        let e = evaluator(store.clone(), RefirePolicy::Always);

        let fired = e.evaluate(user, here()).await;
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].distance_meters, 0.0);
        assert!(fired[0].notification_id.is_some());

        assert!(e.evaluate(user, away()).await.is_empty());

        let rows = store.notifications().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].notification_type, "location_reminder");
        assert_eq!(rows[0].title, "📍 Pharmacy");
        assert_eq!(rows[0].metadata.as_ref().unwrap()["distance"], 0.0);
    }

    #[tokio::test]
    async fn test_always_policy_refires() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        reminder(&store, user, TriggerMode::Enter).await;
        let e = evaluator(store.clone(), RefirePolicy::Always);
        e.evaluate(user, here()).await;
        e.evaluate(user, here()).await;
        assert_eq!(store.notifications().await.len(), 2);
    }

    #[tokio::test]
    async fn test_once_per_entry_fires_on_transitions() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        reminder(&store, user, TriggerMode::Enter).await;
        reminder(&store, user, TriggerMode::Exit).await;
        let e = evaluator(store.clone(), RefirePolicy::OncePerEntry);

        assert_eq!(e.evaluate(user, here()).await.len(), 1);
        assert!(e.evaluate(user, here()).await.is_empty());
        assert_eq!(e.evaluate(user, away()).await.len(), 1);
        assert_eq!(e.evaluate(user, here()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_deactivated_reminder_state_is_dropped() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let kept = reminder(&store, user, TriggerMode::Enter).await;
        let dropped = reminder(&store, user, TriggerMode::Enter).await;
        reminder(&store, other, TriggerMode::Enter).await;
        let e = evaluator(store.clone(), RefirePolicy::OncePerEntry);

        e.evaluate(user, here()).await;
        e.evaluate(other, here()).await;
        assert_eq!(e.inside.len(), 3);

        store.deactivate_location_reminder(dropped).await;
        assert!(e.evaluate(user, here()).await.is_empty());

        assert_eq!(e.inside.len(), 2);
        assert!(e.inside.contains_key(&(user, kept)));
        assert!(!e.inside.contains_key(&(user, dropped)));
    }

    #[tokio::test]
    async fn test_missing_tables_short_circuit() {
        let store = Arc::new(MemoryRecordStore::new().without_location_tables());
        let e = evaluator(store.clone(), RefirePolicy::Always);
        assert!(e.evaluate(Uuid::new_v4(), here()).await.is_empty());
        assert!(store.notifications().await.is_empty());
    }
}
