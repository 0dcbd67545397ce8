//! Push subscription repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gtms_core::result::AppResult;
use gtms_entity::push::{PushSubscription, SubscriptionKeys};

use crate::error::db_error;
use crate::store::PushSubscriptionStore;

/// Repository for Web Push subscriptions.
#[derive(Debug, Clone)]
pub struct PushSubscriptionRepository {
    pool: PgPool,
}

impl PushSubscriptionRepository {
    /// Create a new push subscription repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushSubscriptionStore for PushSubscriptionRepository {
    async fn upsert(
        &self,
        user_id: Uuid,
        endpoint: &str,
        keys: &SubscriptionKeys,
        device_info: Option<serde_json::Value>,
    ) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO push_subscriptions \
             (id, user_id, endpoint, p256dh_key, auth_key, device_info, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE) \
             ON CONFLICT (user_id, endpoint) DO UPDATE SET \
                p256dh_key = EXCLUDED.p256dh_key, \
                auth_key = EXCLUDED.auth_key, \
                device_info = EXCLUDED.device_info, \
                is_active = TRUE, \
                updated_at = NOW() \
             RETURNING id",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(endpoint)
        .bind(&keys.p256dh)
        .bind(&keys.auth)
        .bind(device_info)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save push subscription", e))
    }

    async fn active_for_user(&self, user_id: Uuid) -> AppResult<Vec<PushSubscription>> {
        sqlx::query_as::<_, PushSubscription>(
            "SELECT id, user_id, endpoint, p256dh_key, auth_key, device_info, is_active, \
                    created_at, updated_at \
             FROM push_subscriptions WHERE user_id = $1 AND is_active = TRUE \
             ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list push subscriptions", e))
    }

    async fn deactivate(&self, subscription_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE push_subscriptions SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(subscription_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to deactivate push subscription", e))?;
        Ok(())
    }

    async fn deactivate_by_endpoint(&self, user_id: Uuid, endpoint: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE push_subscriptions SET is_active = FALSE, updated_at = NOW() \
             WHERE user_id = $1 AND endpoint = $2 AND is_active = TRUE",
        )
        .bind(user_id)
        .bind(endpoint)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to unsubscribe push endpoint", e))?;
        Ok(result.rows_affected() > 0)
    }
}
