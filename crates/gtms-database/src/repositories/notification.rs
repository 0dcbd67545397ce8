//! Notification repository implementation.
//!
//! Reads first try the full column list and fall back to a legacy
//! projection with literal defaults when the deployed table predates the
//! sound, channel and push columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use gtms_core::result::AppResult;
use gtms_core::types::pagination::{PageRequest, PageResponse};
use gtms_entity::notification::{
    NewNotification, Notification, NotificationFilter, NotificationTypeStats, ReadState,
};

use crate::error::{db_error, is_schema_missing};
use crate::store::NotificationStore;

const RICH_COLUMNS: &str = "id, user_id, notification_type, title, body, priority, is_read, \
     read_at, push_sent, sent_at, sound_file, sound_enabled, vibration_enabled, push_enabled, \
     related_entity_type, related_entity_id, action_url, metadata, created_at";

const LEGACY_COLUMNS: &str = "id, user_id, notification_type, title, body, priority, is_read, \
     read_at, FALSE AS push_sent, NULL::timestamptz AS sent_at, NULL::text AS sound_file, \
     TRUE AS sound_enabled, TRUE AS vibration_enabled, TRUE AS push_enabled, \
     related_entity_type, related_entity_id, NULL::text AS action_url, NULL::jsonb AS metadata, \
     created_at";

/// Repository for notification rows.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_with(
        &self,
        columns: &str,
        user_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {columns} FROM notifications "));
        qb.push("WHERE user_id = ").push_bind(user_id);
        if unread_only {
            qb.push(" AND is_read = FALSE");
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(limit));
        qb.build_query_as::<Notification>()
            .fetch_all(&self.pool)
            .await
    }

    async fn search_with(
        &self,
        columns: &str,
        user_id: Uuid,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Notification>, sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications ");
        push_filters(&mut count, user_id, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {columns} FROM notifications "));
        push_filters(&mut select, user_id, filter);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let items = select
            .build_query_as::<Notification>()
            .fetch_all(&self.pool)
            .await?;

        Ok(PageResponse::new(items, page, total.max(0) as u64))
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, filter: &NotificationFilter) {
    qb.push("WHERE user_id = ").push_bind(user_id);
    if let Some(kind) = &filter.notification_type {
        qb.push(" AND notification_type = ").push_bind(kind.clone());
    }
    if let Some(start) = filter.start_date {
        qb.push(" AND created_at::date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(" AND created_at::date <= ").push_bind(end);
    }
    match filter.status {
        Some(ReadState::Read) => {
            qb.push(" AND is_read = TRUE");
        }
        Some(ReadState::Unread) => {
            qb.push(" AND is_read = FALSE");
        }
        None => {}
    }
    if let Some(priority) = &filter.priority {
        qb.push(" AND priority = ").push_bind(priority.clone());
    }
    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = format!("%{}%", term.trim());
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR body ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert_rich(&self, new: &NewNotification) -> AppResult<Uuid> {
        let (entity_type, entity_id) = match &new.related_entity {
            Some(e) => (Some(e.entity_type.as_str()), Some(e.entity_id.as_str())),
            None => (None, None),
        };
        let metadata = new
            .metadata
            .clone()
            .unwrap_or_else(|| serde_json::json!({}));

        sqlx::query(
            "INSERT INTO notifications \
             (id, user_id, notification_type, title, body, priority, sound_file, sound_enabled, \
              vibration_enabled, push_enabled, related_entity_type, related_entity_id, \
              action_url, metadata, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(new.id)
        .bind(new.user_id)
        .bind(new.kind.as_str())
        .bind(&new.title)
        .bind(&new.body)
        .bind(new.priority.as_str())
        .bind(new.sound.file_name())
        .bind(new.channels.sound)
        .bind(new.channels.vibration)
        .bind(new.channels.push)
        .bind(entity_type)
        .bind(entity_id)
        .bind(new.action_url.as_deref())
        .bind(metadata)
        .bind(new.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert notification", e))?;
        Ok(new.id)
    }

    async fn insert_reduced(&self, new: &NewNotification) -> AppResult<Uuid> {
        let (entity_type, entity_id) = match &new.related_entity {
            Some(e) => (Some(e.entity_type.as_str()), Some(e.entity_id.as_str())),
            None => (None, None),
        };

        sqlx::query(
            "INSERT INTO notifications \
             (id, user_id, notification_type, title, body, priority, \
              related_entity_type, related_entity_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(new.id)
        .bind(new.user_id)
        .bind(new.kind.as_str())
        .bind(&new.title)
        .bind(&new.body)
        .bind(new.priority.as_str())
        .bind(entity_type)
        .bind(entity_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert notification (reduced)", e))?;
        Ok(new.id)
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>> {
        let rich_sql =
            format!("SELECT {RICH_COLUMNS} FROM notifications WHERE id = $1 AND user_id = $2");
        let rich = sqlx::query_as::<_, Notification>(&rich_sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;
        match rich {
            Err(e) if is_schema_missing(&e) => {
                let legacy_sql = format!(
                    "SELECT {LEGACY_COLUMNS} FROM notifications WHERE id = $1 AND user_id = $2"
                );
                sqlx::query_as::<_, Notification>(&legacy_sql)
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| db_error("Failed to find notification", e))
            }
            other => other.map_err(|e| db_error("Failed to find notification", e)),
        }
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> AppResult<Vec<Notification>> {
        match self.list_with(RICH_COLUMNS, user_id, unread_only, limit).await {
            Err(e) if is_schema_missing(&e) => self
                .list_with(LEGACY_COLUMNS, user_id, unread_only, limit)
                .await
                .map_err(|e| db_error("Failed to list notifications", e)),
            other => other.map_err(|e| db_error("Failed to list notifications", e)),
        }
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $3 \
             WHERE id = $1 AND user_id = $2 AND is_read = FALSE",
        )
        .bind(id)
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark notification read", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_all_read(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $2 \
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark all notifications read", e))?;
        Ok(result.rows_affected())
    }

    async fn mark_push_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET push_sent = TRUE, sent_at = $2 \
             WHERE id = $1 AND push_sent = FALSE",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark notification pushed", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn search(
        &self,
        user_id: Uuid,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        match self.search_with(RICH_COLUMNS, user_id, filter, page).await {
            Err(e) if is_schema_missing(&e) => self
                .search_with(LEGACY_COLUMNS, user_id, filter, page)
                .await
                .map_err(|e| db_error("Failed to search notifications", e)),
            other => other.map_err(|e| db_error("Failed to search notifications", e)),
        }
    }

    async fn type_stats(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<NotificationTypeStats>> {
        sqlx::query_as::<_, NotificationTypeStats>(
            "SELECT notification_type, \
                    COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE is_read) AS read_count, \
                    COUNT(*) FILTER (WHERE push_sent) AS push_sent_count, \
                    (AVG(EXTRACT(EPOCH FROM (read_at - created_at)) / 60.0) \
                        FILTER (WHERE read_at IS NOT NULL))::float8 AS avg_read_minutes \
             FROM notifications \
             WHERE user_id = $1 AND created_at >= $2 \
             GROUP BY notification_type \
             ORDER BY total DESC",
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to compute notification statistics", e))
    }
}
