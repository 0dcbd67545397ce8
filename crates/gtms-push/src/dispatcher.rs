//! Delivery dispatcher.
//!
//! In-app delivery is the notification row itself. Push delivery fans out
//! to every active subscription of the recipient in parallel, each send
//! bounded by a timeout and isolated from the others. A 410 from the push
//! service deactivates that subscription; every other failure is only
//! recorded. `push_sent` is set once, after all sends have settled, and
//! only if at least one succeeded.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use uuid::Uuid;

use gtms_core::config::PushConfig;
use gtms_database::store::{NotificationHistoryStore, NotificationStore, PushSubscriptionStore};
use gtms_entity::notification::{
    DeliveryChannel, HistoryAction, NewHistoryEntry, NotificationKind, NotificationPriority,
};
use gtms_entity::push::PushSubscription;

use crate::error::PushError;
use crate::payload::{PushMessage, PushPayload};
use crate::transport::PushTransport;

/// What a push needs to know about the notification it carries.
#[derive(Debug, Clone)]
pub struct PushContent {
    /// Source notification.
    pub notification_id: Uuid,
    /// Recipient.
    pub user_id: Uuid,
    /// Semantic type.
    pub kind: NotificationKind,
    /// Title.
    pub title: String,
    /// Body.
    pub body: String,
    /// Priority, mapped to the `Urgency` header.
    pub priority: NotificationPriority,
    /// Click-through route.
    pub action_url: Option<String>,
    /// Extra data for the service worker.
    pub metadata: Option<serde_json::Value>,
    /// Replacement tag.
    pub tag: Option<String>,
}

/// Outcome for one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryResult {
    /// Accepted by the push service.
    Delivered,
    /// Endpoint gone; the subscription was deactivated.
    Deactivated,
    /// Any other failure.
    Failed {
        /// Error description.
        error: String,
    },
}

/// Per-subscription outcome.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionOutcome {
    /// Subscription.
    pub subscription_id: Uuid,
    /// Result.
    #[serde(flatten)]
    pub result: DeliveryResult,
}

/// Why push was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The notification has push disabled.
    PushDisabled,
    /// No VAPID key is configured.
    NotConfigured,
    /// The subscription table is not provisioned.
    Unavailable,
}

/// Result of dispatching one notification.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    /// Set when push was not attempted.
    pub skipped: Option<SkipReason>,
    /// One entry per active subscription.
    pub outcomes: Vec<SubscriptionOutcome>,
    /// Whether `push_sent` was set by this dispatch.
    pub push_sent: bool,
}

impl DispatchReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    /// Subscriptions that accepted the message.
    pub fn delivered(&self) -> usize {
        self.count(|r| matches!(r, DeliveryResult::Delivered))
    }

    /// Subscriptions deactivated by this dispatch.
    pub fn deactivated(&self) -> usize {
        self.count(|r| matches!(r, DeliveryResult::Deactivated))
    }

    /// Subscriptions that failed for any other reason.
    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, DeliveryResult::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&DeliveryResult) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.result)).count()
    }
}

/// Delivers built notifications to their recipients' devices.
#[derive(Debug, Clone)]
pub struct DeliveryDispatcher {
    subscriptions: Arc<dyn PushSubscriptionStore>,
    notifications: Arc<dyn NotificationStore>,
    history: Arc<dyn NotificationHistoryStore>,
    transport: Option<Arc<dyn PushTransport>>,
    config: Arc<PushConfig>,
}

impl DeliveryDispatcher {
    /// Create a dispatcher. With no transport, push is always skipped.
    pub fn new(
        subscriptions: Arc<dyn PushSubscriptionStore>,
        notifications: Arc<dyn NotificationStore>,
        history: Arc<dyn NotificationHistoryStore>,
        transport: Option<Arc<dyn PushTransport>>,
        config: Arc<PushConfig>,
    ) -> Self {
        Self {
            subscriptions,
            notifications,
            history,
            transport,
            config,
        }
    }

    /// Application server key for client subscription, if push is set up.
    pub fn public_key(&self) -> Option<&str> {
        self.transport.as_deref().and_then(|t| t.public_key())
    }

    /// Deliver a notification on every enabled channel.
    pub async fn dispatch(&self, content: &PushContent, push_enabled: bool) -> DispatchReport {
        if !push_enabled {
            return DispatchReport::skipped(SkipReason::PushDisabled);
        }
        let Some(transport) = self.transport.clone() else {
            tracing::debug!(notification_id = %content.notification_id, "Push not configured");
            return DispatchReport::skipped(SkipReason::NotConfigured);
        };

        let subscriptions = match self.subscriptions.active_for_user(content.user_id).await {
            Ok(subs) => subs,
            Err(e) if e.is_schema_missing() => {
                tracing::debug!(user_id = %content.user_id, "Push subscription storage not provisioned");
                return DispatchReport::skipped(SkipReason::Unavailable);
            }
            Err(e) => {
                tracing::warn!(user_id = %content.user_id, error = %e, "Failed to load push subscriptions");
                return DispatchReport::skipped(SkipReason::Unavailable);
            }
        };
        if subscriptions.is_empty() {
            return DispatchReport::default();
        }

        let payload = PushPayload::build(content, &self.config);
        let message = match PushMessage::new(&payload, content.priority, self.config.ttl_seconds) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(notification_id = %content.notification_id, error = %e, "Failed to serialize push payload");
                return DispatchReport::default();
            }
        };

        let outcomes = join_all(
            subscriptions
                .iter()
                .map(|sub| self.deliver_one(transport.as_ref(), sub, content, &message)),
        )
        .await;

        let mut report = DispatchReport {
            skipped: None,
            outcomes,
            push_sent: false,
        };
        if report.delivered() > 0 {
            match self
                .notifications
                .mark_push_sent(content.notification_id, Utc::now())
                .await
            {
                Ok(changed) => report.push_sent = changed,
                Err(e) => tracing::warn!(
                    notification_id = %content.notification_id,
                    error = %e,
                    "Failed to mark notification as pushed"
                ),
            }
        }

        tracing::info!(
            notification_id = %content.notification_id,
            user_id = %content.user_id,
            delivered = report.delivered(),
            deactivated = report.deactivated(),
            failed = report.failed(),
            "Push dispatch finished"
        );
        report
    }

    async fn deliver_one(
        &self,
        transport: &dyn PushTransport,
        sub: &PushSubscription,
        content: &PushContent,
        message: &PushMessage,
    ) -> SubscriptionOutcome {
        let timeout = Duration::from_secs(self.config.send_timeout_seconds);
        let sent = match tokio::time::timeout(timeout, transport.send(&sub.endpoint, &sub.keys(), message)).await {
            Ok(result) => result,
            Err(_) => Err(PushError::Timeout),
        };

        let result = match sent {
            Ok(()) => DeliveryResult::Delivered,
            Err(PushError::Gone) => {
                if let Err(e) = self.subscriptions.deactivate(sub.id).await {
                    tracing::error!(subscription_id = %sub.id, error = %e, "Failed to deactivate expired subscription");
                }
                tracing::info!(subscription_id = %sub.id, user_id = %sub.user_id, "Deactivated expired push subscription");
                DeliveryResult::Deactivated
            }
            Err(err) => {
                tracing::warn!(
                    subscription_id = %sub.id,
                    notification_id = %content.notification_id,
                    reason = err.label(),
                    error = %err,
                    "Push delivery failed"
                );
                DeliveryResult::Failed {
                    error: err.to_string(),
                }
            }
        };

        let (action, metadata) = match &result {
            DeliveryResult::Delivered => (
                HistoryAction::Sent,
                serde_json::json!({ "subscription_id": sub.id }),
            ),
            DeliveryResult::Deactivated => (
                HistoryAction::SendFailed,
                serde_json::json!({ "subscription_id": sub.id, "error": "gone", "deactivated": true }),
            ),
            DeliveryResult::Failed { error } => (
                HistoryAction::SendFailed,
                serde_json::json!({ "subscription_id": sub.id, "error": error }),
            ),
        };
        let entry = NewHistoryEntry::new(
            content.notification_id,
            content.user_id,
            action,
            DeliveryChannel::Push,
        )
        .with_metadata(metadata)
        .with_device(sub.device_info.clone());
        if let Err(e) = self.history.append(&entry).await {
            tracing::warn!(notification_id = %content.notification_id, error = %e, "Failed to record delivery history");
        }

        SubscriptionOutcome {
            subscription_id: sub.id,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingTransport;
    use gtms_database::MemoryRecordStore;
    use gtms_entity::notification::{ChannelFlags, NewNotification, NotificationSound};
    use gtms_entity::push::SubscriptionKeys;

    fn keys() -> SubscriptionKeys {
        SubscriptionKeys {
            p256dh: "BPk".into(),
            auth: "YXV0aA".into(),
        }
    }

    async fn seeded(store: &MemoryRecordStore, user: Uuid) -> PushContent {
        let id = Uuid::now_v7();
        store
            .insert_rich(&NewNotification {
                id,
                user_id: user,
                kind: NotificationKind::HealthAlert,
                title: "High IOP".into(),
                body: "Left eye 24 mmHg".into(),
                priority: NotificationPriority::High,
                sound: NotificationSound::Emergency,
                channels: ChannelFlags::default(),
                related_entity: None,
                action_url: Some("/iop-measurements".into()),
                metadata: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        PushContent {
            notification_id: id,
            user_id: user,
            kind: NotificationKind::HealthAlert,
            title: "High IOP".into(),
            body: "Left eye 24 mmHg".into(),
            priority: NotificationPriority::High,
            action_url: Some("/iop-measurements".into()),
            metadata: None,
            tag: None,
        }
    }

    fn dispatcher(
        store: Arc<MemoryRecordStore>,
        transport: Option<Arc<RecordingTransport>>,
        timeout_secs: u64,
    ) -> DeliveryDispatcher {
        let config = PushConfig {
            send_timeout_seconds: timeout_secs,
            ..PushConfig::default()
        };
        DeliveryDispatcher::new(
            store.clone(),
            store.clone(),
            store,
            transport.map(|t| t as Arc<dyn PushTransport>),
            Arc::new(config),
        )
    }

    #[tokio::test]
    async fn test_gone_deactivates_only_that_subscription() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        let content = seeded(&store, user).await;
        let a = store.upsert(user, "https://push/a", &keys(), None).await.unwrap();
        let b = store.upsert(user, "https://push/b", &keys(), None).await.unwrap();

        let transport = Arc::new(RecordingTransport::new());
        transport.fail("https://push/a", PushError::Gone).await;

        let report = dispatcher(store.clone(), Some(transport.clone()), 5)
            .dispatch(&content, true)
            .await;

        assert_eq!(report.delivered(), 1);
        assert_eq!(report.deactivated(), 1);
        assert!(report.push_sent);
        assert_eq!(transport.sent().await.len(), 2);

        let subs = store.subscriptions().await;
        assert!(!subs.iter().find(|s| s.id == a).unwrap().is_active);
        assert!(subs.iter().find(|s| s.id == b).unwrap().is_active);

        let row = store.find(content.notification_id, user).await.unwrap().unwrap();
        assert!(row.push_sent);
        assert!(row.sent_at.is_some());
    }

    #[tokio::test]
    async fn test_other_failures_keep_subscription_and_push_sent_false() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        let content = seeded(&store, user).await;
        store.upsert(user, "https://push/a", &keys(), None).await.unwrap();

        let transport = Arc::new(RecordingTransport::new());
        transport
            .fail("https://push/a", PushError::Rejected { status: 404 })
            .await;

        let report = dispatcher(store.clone(), Some(transport), 5)
            .dispatch(&content, true)
            .await;

        assert_eq!(report.failed(), 1);
        assert!(!report.push_sent);
        assert!(store.subscriptions().await[0].is_active);
        let history = store.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action_type, "send_failed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_plain_failure() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        let content = seeded(&store, user).await;
        store.upsert(user, "https://push/slow", &keys(), None).await.unwrap();

        let transport = Arc::new(RecordingTransport::new());
        transport
            .hang("https://push/slow", Duration::from_secs(60))
            .await;

        let report = dispatcher(store.clone(), Some(transport), 2)
            .dispatch(&content, true)
            .await;

        assert_eq!(
            report.outcomes[0].result,
            DeliveryResult::Failed {
                error: PushError::Timeout.to_string()
            }
        );
        assert!(store.subscriptions().await[0].is_active);
    }

    #[tokio::test]
    async fn test_skips_when_disabled_or_unconfigured() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        let content = seeded(&store, user).await;
        store.upsert(user, "https://push/a", &keys(), None).await.unwrap();

        let transport = Arc::new(RecordingTransport::new());
        let report = dispatcher(store.clone(), Some(transport.clone()), 5)
            .dispatch(&content, false)
            .await;
        assert_eq!(report.skipped, Some(SkipReason::PushDisabled));
        assert!(transport.sent().await.is_empty());

        let report = dispatcher(store, None, 5).dispatch(&content, true).await;
        assert_eq!(report.skipped, Some(SkipReason::NotConfigured));
    }

    #[tokio::test]
    async fn test_unprovisioned_push_table_is_skipped() {
        let store = Arc::new(MemoryRecordStore::new().without_push_tables());
        let user = Uuid::new_v4();
        let content = seeded(&store, user).await;
        let report = dispatcher(store, Some(Arc::new(RecordingTransport::new())), 5)
            .dispatch(&content, true)
            .await;
        assert_eq!(report.skipped, Some(SkipReason::Unavailable));
    }
}
