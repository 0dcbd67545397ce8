//! Push subscription entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A browser push registration. Unique per (user, endpoint).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PushSubscription {
    /// Subscription identifier.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Push service endpoint URI.
    pub endpoint: String,
    /// Client P-256 public key, base64url.
    pub p256dh_key: String,
    /// Client auth secret, base64url.
    pub auth_key: String,
    /// Device descriptor supplied at subscribe time.
    pub device_info: Option<serde_json::Value>,
    /// Cleared when the push service reports the endpoint gone.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl PushSubscription {
    /// The encryption keys.
    pub fn keys(&self) -> SubscriptionKeys {
        SubscriptionKeys {
            p256dh: self.p256dh_key.clone(),
            auth: self.auth_key.clone(),
        }
    }
}

/// Encryption material supplied by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Uncompressed P-256 public key, base64url.
    pub p256dh: String,
    /// 16-byte auth secret, base64url.
    pub auth: String,
}
