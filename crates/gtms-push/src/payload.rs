//! Push payload construction.

use serde::Serialize;
use serde_json::{Map, Value};

use gtms_core::config::PushConfig;
use gtms_entity::notification::NotificationPriority;

use crate::dispatcher::PushContent;

/// Longest `Topic` header value push services accept.
const MAX_TOPIC_LEN: usize = 32;

/// A notification action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushAction {
    /// Action identifier reported back by the service worker.
    pub action: &'static str,
    /// Button label.
    pub title: &'static str,
}

/// JSON document the service worker receives.
#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    /// Notification title.
    pub title: String,
    /// Notification text.
    pub body: String,
    /// Icon URL.
    pub icon: String,
    /// Badge URL.
    pub badge: String,
    /// Replacement tag.
    pub tag: String,
    /// Click-through data.
    pub data: Map<String, Value>,
    /// Action buttons.
    pub actions: Vec<PushAction>,
}

impl PushPayload {
    /// Build the payload for a notification.
    ///
    /// `data` carries the notification metadata plus `url`,
    /// `notification_id` and `type`; those three always win over
    /// metadata keys of the same name.
    pub fn build(content: &PushContent, config: &PushConfig) -> Self {
        let mut data = match &content.metadata {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        let url = content
            .action_url
            .clone()
            .unwrap_or_else(|| config.default_url.clone());
        data.insert("url".into(), Value::String(url));
        data.insert(
            "notification_id".into(),
            Value::String(content.notification_id.to_string()),
        );
        data.insert(
            "type".into(),
            Value::String(content.kind.as_str().to_string()),
        );

        Self {
            title: content.title.clone(),
            body: content.body.clone(),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            tag: content
                .tag
                .clone()
                .unwrap_or_else(|| config.default_tag.clone()),
            data,
            actions: vec![
                PushAction {
                    action: "open",
                    title: "Open",
                },
                PushAction {
                    action: "dismiss",
                    title: "Dismiss",
                },
            ],
        }
    }
}

/// A serialized payload plus the RFC 8030 request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    /// Plaintext JSON payload.
    pub payload: Vec<u8>,
    /// `TTL` header.
    pub ttl_seconds: u32,
    /// `Urgency` header.
    pub urgency: &'static str,
    /// `Topic` header.
    pub topic: Option<String>,
}

impl PushMessage {
    /// Serialize a payload for delivery.
    pub fn new(
        payload: &PushPayload,
        priority: NotificationPriority,
        ttl_seconds: u32,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            payload: serde_json::to_vec(payload)?,
            ttl_seconds,
            urgency: priority.push_urgency(),
            topic: topic_from_tag(&payload.tag),
        })
    }
}

/// Reduce a tag to the URL-safe base64 alphabet and topic length limit.
fn topic_from_tag(tag: &str) -> Option<String> {
    let topic: String = tag
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_TOPIC_LEN)
        .collect();
    (!topic.is_empty()).then_some(topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtms_entity::notification::NotificationKind;
    use uuid::Uuid;

    fn content(action_url: Option<&str>) -> PushContent {
        PushContent {
            notification_id: Uuid::nil(),
            user_id: Uuid::nil(),
            kind: NotificationKind::MedicationReminder,
            title: "Time for your drops".into(),
            body: "Latanoprost, both eyes".into(),
            priority: NotificationPriority::High,
            action_url: action_url.map(str::to_string),
            metadata: Some(serde_json::json!({"reminder_id": "r1", "url": "/ignored"})),
            tag: None,
        }
    }

    #[test]
    fn test_payload_defaults_and_data() {
        let payload = PushPayload::build(&content(None), &PushConfig::default());
        assert_eq!(payload.tag, "gtms-notification");
        assert_eq!(payload.data["url"], "/notifications");
        assert_eq!(payload.data["type"], "medication_reminder");
        assert_eq!(payload.data["reminder_id"], "r1");
        assert_eq!(payload.actions[0].action, "open");
        assert_eq!(payload.actions[1].action, "dismiss");
    }

    #[test]
    fn test_action_url_wins() {
        let payload = PushPayload::build(&content(Some("/medication-tracker")), &PushConfig::default());
        assert_eq!(payload.data["url"], "/medication-tracker");
    }

    #[test]
    fn test_message_headers() {
        let payload = PushPayload::build(&content(None), &PushConfig::default());
        let message = PushMessage::new(&payload, NotificationPriority::High, 60).unwrap();
        assert_eq!(message.urgency, "high");
        assert_eq!(message.topic.as_deref(), Some("gtms-notification"));
        assert_eq!(topic_from_tag("a b/c"), Some("abc".into()));
        assert_eq!(topic_from_tag("///"), None);
        assert_eq!(topic_from_tag(&"x".repeat(40)).map(|t| t.len()), Some(32));
    }
}
