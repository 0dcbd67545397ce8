//! Notification history repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gtms_core::result::AppResult;
use gtms_entity::notification::{NewHistoryEntry, NotificationHistoryEntry};

use crate::error::db_error;
use crate::store::NotificationHistoryStore;

/// Repository for the append-only notification audit trail.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    /// Create a new history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationHistoryStore for HistoryRepository {
    async fn append(&self, entry: &NewHistoryEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notification_history \
             (id, notification_id, user_id, action_type, channel, device_info, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::now_v7())
        .bind(entry.notification_id)
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(entry.channel.as_str())
        .bind(entry.device_info.clone())
        .bind(entry.metadata.clone())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to append notification history", e))?;
        Ok(())
    }

    async fn list_for_notification(
        &self,
        notification_id: Uuid,
    ) -> AppResult<Vec<NotificationHistoryEntry>> {
        sqlx::query_as::<_, NotificationHistoryEntry>(
            "SELECT id, notification_id, user_id, action_type, channel, device_info, metadata, \
                    action_timestamp \
             FROM notification_history WHERE notification_id = $1 \
             ORDER BY action_timestamp ASC, id ASC",
        )
        .bind(notification_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list notification history", e))
    }
}
