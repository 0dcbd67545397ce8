//! Append-only notification audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What happened to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// The row was written.
    Created,
    /// A push delivery succeeded.
    Sent,
    /// A push delivery failed.
    SendFailed,
    /// The user read it.
    Read,
}

impl HistoryAction {
    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Sent => "sent",
            Self::SendFailed => "send_failed",
            Self::Read => "read",
        }
    }
}

/// Channel an action happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    /// In-app inbox.
    App,
    /// Web Push.
    Push,
}

impl DeliveryChannel {
    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Push => "push",
        }
    }
}

/// A stored history entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationHistoryEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// The notification this entry belongs to.
    pub notification_id: Uuid,
    /// The notification's owner.
    pub user_id: Uuid,
    /// Action type, as stored.
    pub action_type: String,
    /// Channel, as stored.
    pub channel: String,
    /// Device descriptor, if any.
    pub device_info: Option<serde_json::Value>,
    /// Extra detail (subscription id, error, status code).
    pub metadata: Option<serde_json::Value>,
    /// When the action happened.
    pub action_timestamp: DateTime<Utc>,
}

/// Data for appending a history entry.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    /// The notification.
    pub notification_id: Uuid,
    /// Its owner.
    pub user_id: Uuid,
    /// Action.
    pub action: HistoryAction,
    /// Channel.
    pub channel: DeliveryChannel,
    /// Device descriptor.
    pub device_info: Option<serde_json::Value>,
    /// Extra detail.
    pub metadata: serde_json::Value,
}

impl NewHistoryEntry {
    /// Build an entry with empty metadata.
    pub fn new(
        notification_id: Uuid,
        user_id: Uuid,
        action: HistoryAction,
        channel: DeliveryChannel,
    ) -> Self {
        Self {
            notification_id,
            user_id,
            action,
            channel,
            device_info: None,
            metadata: serde_json::json!({}),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach a device descriptor.
    pub fn with_device(mut self, device_info: Option<serde_json::Value>) -> Self {
        self.device_info = device_info;
        self
    }
}
