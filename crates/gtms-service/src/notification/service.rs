//! Notification inbox queries and read-state changes.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use gtms_core::config::{Locale, NotificationsConfig};
use gtms_core::error::AppError;
use gtms_core::types::pagination::{PageRequest, PageResponse};
use gtms_database::store::{NotificationHistoryStore, NotificationStore};
use gtms_entity::display::{notification_type_label, priority_label};
use gtms_entity::notification::{
    DeliveryChannel, HistoryAction, NewHistoryEntry, Notification, NotificationFilter,
    NotificationKind,
};

use crate::context::RequestContext;

/// A notification row with its display labels.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub notification_type_display: String,
    pub priority_display: String,
}

impl NotificationView {
    fn new(notification: Notification, locale: Locale) -> Self {
        Self {
            notification_type_display: notification_type_label(&notification.kind(), locale),
            priority_display: priority_label(&notification.priority, locale),
            notification,
        }
    }
}

/// Per-type delivery and engagement figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAnalytics {
    pub notification_type: String,
    pub notification_type_display: String,
    pub total_sent: i64,
    pub total_read: i64,
    pub total_push_sent: i64,
    pub avg_read_time_minutes: Option<f64>,
    pub read_rate: f64,
}

/// Manages the caller's notification inbox.
#[derive(Debug, Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationStore>,
    history: Arc<dyn NotificationHistoryStore>,
    config: Arc<NotificationsConfig>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        history: Arc<dyn NotificationHistoryStore>,
        config: Arc<NotificationsConfig>,
    ) -> Self {
        Self {
            notifications,
            history,
            config,
        }
    }

    /// The locale used for display labels.
    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    /// Resolve a requested list limit. Out-of-range values fall back to
    /// the default.
    pub fn list_limit(&self, requested: Option<i64>) -> u32 {
        requested
            .and_then(|l| u32::try_from(l).ok())
            .filter(|l| (1..=self.config.max_list_limit).contains(l))
            .unwrap_or(self.config.default_list_limit)
    }

    /// Lists the newest notifications for the current user.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<NotificationView>, AppError> {
        let limit = self.list_limit(limit);
        let rows = match self
            .notifications
            .list_for_user(ctx.user_id, unread_only, limit)
            .await
        {
            Ok(rows) => rows,
            Err(e) if e.is_schema_missing() => {
                tracing::warn!(user_id = %ctx.user_id, "Notifications table missing, returning empty list");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let locale = self.locale();
        Ok(rows
            .into_iter()
            .map(|n| NotificationView::new(n, locale))
            .collect())
    }

    /// Marks a notification as read. Repeated calls leave the first
    /// `read_at` in place and do not append history.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> Result<bool, AppError> {
        let changed = self
            .notifications
            .mark_read(notification_id, ctx.user_id, Utc::now())
            .await?;

        if !changed {
            return match self.notifications.find(notification_id, ctx.user_id).await? {
                Some(_) => Ok(false),
                None => Err(AppError::not_found("Notification not found")
                    .with_code("NOTIFICATION_NOT_FOUND")),
            };
        }

        let entry = NewHistoryEntry::new(
            notification_id,
            ctx.user_id,
            HistoryAction::Read,
            DeliveryChannel::App,
        );
        if let Err(e) = self.history.append(&entry).await {
            tracing::warn!(notification_id = %notification_id, error = %e, "Failed to record read history");
        }
        Ok(true)
    }

    /// Marks all notifications as read for the current user.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let count = self
            .notifications
            .mark_all_read(ctx.user_id, Utc::now())
            .await?;
        tracing::info!(user_id = %ctx.user_id, count, "Marked all notifications read");
        Ok(count)
    }

    /// Filtered, paginated notification history.
    pub async fn history(
        &self,
        ctx: &RequestContext,
        filter: &NotificationFilter,
        page: Option<u64>,
        page_size: Option<u64>,
    ) -> Result<PageResponse<NotificationView>, AppError> {
        let size = page_size
            .filter(|s| (1..=self.config.max_history_page_size).contains(s))
            .unwrap_or(self.config.history_page_size);
        let page = PageRequest::new(page.unwrap_or(1), size);
        let locale = self.locale();
        match self.notifications.search(ctx.user_id, filter, &page).await {
            Ok(result) => Ok(result.map(|n| NotificationView::new(n, locale))),
            Err(e) if e.is_schema_missing() => Ok(PageResponse::empty(&page)),
            Err(e) => Err(e),
        }
    }

    /// Per-type analytics over the last `period_days` days, busiest type
    /// first.
    pub async fn analytics(
        &self,
        ctx: &RequestContext,
        period_days: i64,
    ) -> Result<Vec<TypeAnalytics>, AppError> {
        let since = Utc::now() - Duration::days(period_days);
        let locale = self.locale();
        let mut stats: Vec<TypeAnalytics> = self
            .notifications
            .type_stats(ctx.user_id, since)
            .await?
            .into_iter()
            .map(|s| TypeAnalytics {
                notification_type_display: notification_type_label(
                    &NotificationKind::parse(&s.notification_type),
                    locale,
                ),
                read_rate: percentage(s.read_count, s.total),
                avg_read_time_minutes: s.avg_read_minutes.map(round2),
                total_sent: s.total,
                total_read: s.read_count,
                total_push_sent: s.push_sent_count,
                notification_type: s.notification_type,
            })
            .collect();
        stats.sort_by(|a, b| b.total_sent.cmp(&a.total_sent));
        Ok(stats)
    }
}

/// `part / whole * 100`, rounded to 2 decimals; 0 when `whole` is 0.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round2((part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0))
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtms_database::MemoryRecordStore;
    use gtms_entity::notification::{ChannelFlags, NewNotification, NotificationPriority, NotificationSound};

    fn service(store: Arc<MemoryRecordStore>) -> NotificationService {
        NotificationService::new(store.clone(), store, Arc::new(NotificationsConfig::default()))
    }

    async fn seed(store: &MemoryRecordStore, user: Uuid, kind: NotificationKind) -> Uuid {
        let id = Uuid::now_v7();
        store
            .insert_rich(&NewNotification {
                id,
                user_id: user,
                sound: NotificationSound::for_kind(&kind),
                kind,
                title: "Reminder".into(),
                body: "Take your drops".into(),
                priority: NotificationPriority::High,
                channels: ChannelFlags::default(),
                related_entity: None,
                action_url: None,
                metadata: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        id
    }

    #[test]
    fn test_percentage_handles_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(8, 10), 80.0);
        assert_eq!(percentage(1, 3), 33.33);
    }

    #[test]
    fn test_list_limit_falls_back() {
        let svc = service(Arc::new(MemoryRecordStore::new()));
        assert_eq!(svc.list_limit(None), 50);
        assert_eq!(svc.list_limit(Some(10)), 10);
        assert_eq!(svc.list_limit(Some(0)), 50);
        assert_eq!(svc.list_limit(Some(1001)), 50);
        assert_eq!(svc.list_limit(Some(-3)), 50);
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        let id = seed(&store, user, NotificationKind::MedicationReminder).await;
        let svc = service(store.clone());
        let ctx = RequestContext::new(user, "patient");

        assert!(svc.mark_read(&ctx, id).await.unwrap());
        let first = store.find(id, user).await.unwrap().unwrap().read_at;
        assert!(!svc.mark_read(&ctx, id).await.unwrap());
        let row = store.find(id, user).await.unwrap().unwrap();
        assert!(row.is_read);
        assert_eq!(row.read_at, first);

        let reads = store
            .history()
            .await
            .into_iter()
            .filter(|h| h.action_type == "read")
            .count();
        assert_eq!(reads, 1);
    }

    #[tokio::test]
    async fn test_mark_read_of_foreign_notification_is_not_found() {
        let store = Arc::new(MemoryRecordStore::new());
        let id = seed(&store, Uuid::new_v4(), NotificationKind::HealthAlert).await;
        let svc = service(store);
        let err = svc
            .mark_read(&RequestContext::new(Uuid::new_v4(), "patient"), id)
            .await
            .unwrap_err();
        assert_eq!(err.code, Some("NOTIFICATION_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_list_carries_labels_and_tolerates_missing_table() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        seed(&store, user, NotificationKind::MedicationReminder).await;
        let ctx = RequestContext::new(user, "patient");
        let rows = service(store).list(&ctx, false, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].notification_type_display, "แจ้งเตือนยา");
        assert_eq!(rows[0].priority_display, "สูง");

        let missing = service(Arc::new(MemoryRecordStore::new().without_notification_table()));
        assert!(missing.list(&ctx, true, Some(5)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analytics_orders_by_volume() {
        let store = Arc::new(MemoryRecordStore::new());
        let user = Uuid::new_v4();
        let a = seed(&store, user, NotificationKind::HealthAlert).await;
        seed(&store, user, NotificationKind::MedicationReminder).await;
        seed(&store, user, NotificationKind::MedicationReminder).await;
        let svc = service(store);
        let ctx = RequestContext::new(user, "patient");
        svc.mark_read(&ctx, a).await.unwrap();

        let stats = svc.analytics(&ctx, 30).await.unwrap();
        assert_eq!(stats[0].notification_type, "medication_reminder");
        assert_eq!(stats[0].total_sent, 2);
        assert_eq!(stats[1].read_rate, 100.0);
    }
}
