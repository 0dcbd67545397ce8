//! Notification factory: the single writer of notification rows.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use gtms_database::store::{NotificationHistoryStore, NotificationStore};
use gtms_entity::notification::{
    ChannelFlags, DeliveryChannel, EntityRef, HistoryAction, NewHistoryEntry, NewNotification,
    NotificationKind, NotificationPriority, NotificationSound,
};
use gtms_push::{DeliveryDispatcher, DispatchReport, PushContent};

/// A semantic event to be turned into a notification.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub priority: NotificationPriority,
    pub channels: ChannelFlags,
    pub related_entity: Option<EntityRef>,
    pub action_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl NotificationRequest {
    /// Start a request with every channel enabled.
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        priority: NotificationPriority,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            body: body.into(),
            priority,
            channels: ChannelFlags::default(),
            related_entity: None,
            action_url: None,
            metadata: None,
        }
    }

    /// Cross-reference the entity that caused the notification.
    pub fn entity(mut self, entity_type: &str, entity_id: impl ToString) -> Self {
        self.related_entity = Some(EntityRef::new(entity_type, entity_id));
        self
    }

    /// Route opened when the notification is clicked.
    pub fn action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Free-form data stored with the row and forwarded to push clients.
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Override the channel flags.
    pub fn channels(mut self, channels: ChannelFlags) -> Self {
        self.channels = channels;
        self
    }
}

/// What the factory hands back to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedNotification {
    pub notification_id: Uuid,
    pub sound_file: &'static str,
    pub channels: ChannelFlags,
    /// Whether the row went through the legacy column set.
    pub reduced: bool,
    pub delivery: DispatchReport,
}

/// Builds, stores and dispatches notifications.
#[derive(Debug, Clone)]
pub struct NotificationFactory {
    notifications: Arc<dyn NotificationStore>,
    history: Arc<dyn NotificationHistoryStore>,
    dispatcher: Arc<DeliveryDispatcher>,
}

impl NotificationFactory {
    /// Creates a new notification factory.
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        history: Arc<dyn NotificationHistoryStore>,
        dispatcher: Arc<DeliveryDispatcher>,
    ) -> Self {
        Self {
            notifications,
            history,
            dispatcher,
        }
    }

    /// Store one notification and deliver it.
    ///
    /// Returns `None` when the row could not be written at all. Storage
    /// that lacks the optional columns gets the reduced insert instead.
    pub async fn create(&self, request: NotificationRequest) -> Option<CreatedNotification> {
        let sound = NotificationSound::for_kind(&request.kind);
        let new = NewNotification {
            id: Uuid::now_v7(),
            user_id: request.user_id,
            kind: request.kind,
            title: request.title,
            body: request.body,
            priority: request.priority,
            sound,
            channels: request.channels,
            related_entity: request.related_entity,
            action_url: request.action_url,
            metadata: request.metadata,
            created_at: Utc::now(),
        };

        let (notification_id, reduced) = match self.notifications.insert_rich(&new).await {
            Ok(id) => (id, false),
            Err(e) if e.is_schema_missing() => {
                tracing::warn!(
                    user_id = %new.user_id,
                    error = %e,
                    "Notification columns missing, using reduced insert"
                );
                match self.notifications.insert_reduced(&new).await {
                    Ok(id) => (id, true),
                    Err(e) => {
                        tracing::error!(user_id = %new.user_id, error = %e, "Failed to create notification");
                        return None;
                    }
                }
            }
            Err(e) => {
                tracing::error!(user_id = %new.user_id, error = %e, "Failed to create notification");
                return None;
            }
        };

        let created = NewHistoryEntry::new(
            notification_id,
            new.user_id,
            HistoryAction::Created,
            DeliveryChannel::App,
        )
        .with_metadata(serde_json::json!({
            "notification_type": new.kind.as_str(),
            "priority": new.priority.as_str(),
            "sound_file": sound.file_name(),
        }));
        if let Err(e) = self.history.append(&created).await {
            tracing::warn!(notification_id = %notification_id, error = %e, "Failed to record notification history");
        }

        tracing::info!(
            notification_id = %notification_id,
            user_id = %new.user_id,
            notification_type = new.kind.as_str(),
            "Notification created"
        );

        let content = PushContent {
            notification_id,
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            body: new.body,
            priority: new.priority,
            action_url: new.action_url,
            metadata: new.metadata,
            tag: None,
        };
        let delivery = self.dispatcher.dispatch(&content, new.channels.push).await;

        Some(CreatedNotification {
            notification_id,
            sound_file: sound.file_name(),
            channels: new.channels,
            reduced,
            delivery,
        })
    }
}
