//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::{NotificationKind, NotificationPriority};
use super::sound::NotificationSound;

/// A notification row.
///
/// Rows written through the reduced insert carry defaults for the
/// channel and sound columns when read back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// Semantic type, as stored.
    pub notification_type: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Priority, as stored.
    pub priority: String,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was first read.
    pub read_at: Option<DateTime<Utc>>,
    /// Whether at least one push delivery succeeded.
    pub push_sent: bool,
    /// When push delivery first succeeded.
    pub sent_at: Option<DateTime<Utc>>,
    /// Sound asset file name.
    pub sound_file: Option<String>,
    /// Play a sound on the client.
    pub sound_enabled: bool,
    /// Vibrate on the client.
    pub vibration_enabled: bool,
    /// Deliver through Web Push.
    pub push_enabled: bool,
    /// Related entity type.
    pub related_entity_type: Option<String>,
    /// Related entity identifier.
    pub related_entity_id: Option<String>,
    /// Client route opened on click.
    pub action_url: Option<String>,
    /// Free-form metadata.
    pub metadata: Option<serde_json::Value>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Parsed semantic type.
    pub fn kind(&self) -> NotificationKind {
        NotificationKind::parse(&self.notification_type)
    }

    /// Parsed priority, defaulting to medium for unrecognized values.
    pub fn priority(&self) -> NotificationPriority {
        NotificationPriority::parse(&self.priority).unwrap_or_default()
    }
}

/// Client-side channel switches stored with each notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFlags {
    /// Play a sound.
    pub sound: bool,
    /// Vibrate.
    pub vibration: bool,
    /// Deliver through Web Push.
    pub push: bool,
}

impl Default for ChannelFlags {
    fn default() -> Self {
        Self {
            sound: true,
            vibration: true,
            push: true,
        }
    }
}

/// Cross-reference to the record that caused a notification or alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity type, e.g. `appointment`.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: String,
}

impl EntityRef {
    /// Build a reference.
    pub fn new(entity_type: impl Into<String>, entity_id: impl ToString) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.to_string(),
        }
    }
}

/// Data required to insert a notification row.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Identifier assigned before insert.
    pub id: Uuid,
    /// Recipient.
    pub user_id: Uuid,
    /// Semantic type.
    pub kind: NotificationKind,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Priority.
    pub priority: NotificationPriority,
    /// Selected sound.
    pub sound: NotificationSound,
    /// Channel switches.
    pub channels: ChannelFlags,
    /// Optional cross-reference.
    pub related_entity: Option<EntityRef>,
    /// Optional click-through route.
    pub action_url: Option<String>,
    /// Optional metadata object.
    pub metadata: Option<serde_json::Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
