//! Web Push delivery configuration.

use serde::{Deserialize, Serialize};

/// Web Push (RFC 8030 / 8291 / 8292) settings.
///
/// Delivery is disabled when `vapid_private_key` is empty, in which case
/// notifications stay in-app only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Master switch for push delivery.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Contact URI placed in the VAPID `sub` claim.
    #[serde(default = "default_subject")]
    pub vapid_subject: String,
    /// Raw P-256 private scalar, base64url encoded.
    #[serde(default)]
    pub vapid_private_key: String,
    /// Time-to-live header sent to the push service, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u32,
    /// Upper bound on a single push-service call, in seconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_seconds: u64,
    /// Icon shown by the client notification.
    #[serde(default = "default_icon")]
    pub icon: String,
    /// Badge shown by the client notification.
    #[serde(default = "default_badge")]
    pub badge: String,
    /// Tag used when the notification does not carry one.
    #[serde(default = "default_tag")]
    pub default_tag: String,
    /// Click-through URL used when the notification has no action URL.
    #[serde(default = "default_url")]
    pub default_url: String,
}

impl PushConfig {
    /// Whether push delivery can be attempted at all.
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.vapid_private_key.trim().is_empty()
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vapid_subject: default_subject(),
            vapid_private_key: String::new(),
            ttl_seconds: default_ttl(),
            send_timeout_seconds: default_send_timeout(),
            icon: default_icon(),
            badge: default_badge(),
            default_tag: default_tag(),
            default_url: default_url(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_subject() -> String {
    "mailto:support@gtms.local".to_string()
}

fn default_ttl() -> u32 {
    86_400
}

fn default_send_timeout() -> u64 {
    10
}

fn default_icon() -> String {
    "/icons/medication-icon-192.png".to_string()
}

fn default_badge() -> String {
    "/icons/badge-72.png".to_string()
}

fn default_tag() -> String {
    "gtms-notification".to_string()
}

fn default_url() -> String {
    "/notifications".to_string()
}
