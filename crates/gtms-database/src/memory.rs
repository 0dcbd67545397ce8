//! In-memory record store.
//!
//! Implements every record-store trait over plain vectors behind a
//! `tokio::sync::RwLock`. Schema flags reproduce the deployments the
//! PostgreSQL repositories have to cope with: a notifications table
//! without the rich columns, and push or location tables that were never
//! provisioned.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use gtms_core::error::AppError;
use gtms_core::result::AppResult;
use gtms_core::types::pagination::{PageRequest, PageResponse};
use gtms_entity::alert::{Alert, AlertStatus, NewAlert};
use gtms_entity::clinical::{Appointment, AppointmentStatus, IopMeasurement};
use gtms_entity::compliance::{
    AppointmentCounts, ComplianceHistoryRow, ComplianceReport, MedicationUsageRow,
    NewComplianceReport, NotificationReadStats,
};
use gtms_entity::location::{LocationReminder, NewLocationReminder, NewUserLocation};
use gtms_entity::medication::{InventoryRow, MedicationReminder, UsageRecord, UsageStatus};
use gtms_entity::notification::{
    NewHistoryEntry, NewNotification, Notification, NotificationFilter, NotificationHistoryEntry,
    NotificationTypeStats, ReadState,
};
use gtms_entity::push::{PushSubscription, SubscriptionKeys};

use crate::store::{
    AlertStore, ClinicalStore, ComplianceStore, LocationStore, NotificationHistoryStore,
    NotificationStore, PushSubscriptionStore,
};

#[derive(Debug, Default)]
struct Tables {
    notifications: Vec<Notification>,
    history: Vec<NotificationHistoryEntry>,
    alerts: Vec<Alert>,
    subscriptions: Vec<PushSubscription>,
    locations: Vec<NewUserLocation>,
    location_reminders: Vec<LocationReminder>,
    iop: Vec<IopMeasurement>,
    reminders: Vec<MedicationReminder>,
    usage: Vec<UsageRecord>,
    inventory: Vec<InventoryRow>,
    appointments: Vec<Appointment>,
    reports: Vec<ComplianceReport>,
}

#[derive(Debug, Default, Clone, Copy)]
struct SchemaFlags {
    legacy_notifications: bool,
    notifications_missing: bool,
    push_missing: bool,
    location_missing: bool,
}

/// In-memory implementation of every record-store trait.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
    schema: SchemaFlags,
    failing_users: HashSet<Uuid>,
}

impl MemoryRecordStore {
    /// An empty store with the full schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications table without the sound, channel and push columns.
    pub fn with_legacy_notifications(mut self) -> Self {
        self.schema.legacy_notifications = true;
        self
    }

    /// No notifications table at all.
    pub fn without_notification_table(mut self) -> Self {
        self.schema.notifications_missing = true;
        self
    }

    /// No push subscription table.
    pub fn without_push_tables(mut self) -> Self {
        self.schema.push_missing = true;
        self
    }

    /// No location tables.
    pub fn without_location_tables(mut self) -> Self {
        self.schema.location_missing = true;
        self
    }

    /// Make every notification insert for `user_id` fail with a
    /// database error.
    pub fn with_failing_user(mut self, user_id: Uuid) -> Self {
        self.failing_users.insert(user_id);
        self
    }

    // ── Seeding ──────────────────────────────────────────────────

    /// Add an IOP reading.
    pub async fn add_iop_measurement(&self, row: IopMeasurement) {
        self.tables.write().await.iop.push(row);
    }

    /// Add a medication reminder.
    pub async fn add_medication_reminder(&self, row: MedicationReminder) {
        self.tables.write().await.reminders.push(row);
    }

    /// Add a usage record.
    pub async fn add_usage_record(&self, row: UsageRecord) {
        self.tables.write().await.usage.push(row);
    }

    /// Add an inventory row.
    pub async fn add_inventory(&self, row: InventoryRow) {
        self.tables.write().await.inventory.push(row);
    }

    /// Add an appointment.
    pub async fn add_appointment(&self, row: Appointment) {
        self.tables.write().await.appointments.push(row);
    }

    /// Add a fully formed notification row.
    pub async fn add_notification(&self, row: Notification) {
        self.tables.write().await.notifications.push(row);
    }

    /// Mark a location reminder inactive.
    pub async fn deactivate_location_reminder(&self, reminder_id: Uuid) {
        let mut tables = self.tables.write().await;
        if let Some(r) = tables.location_reminders.iter_mut().find(|r| r.id == reminder_id) {
            r.is_active = false;
        }
    }

    // ── Inspection ───────────────────────────────────────────────

    /// Every notification row.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.tables.read().await.notifications.clone()
    }

    /// Every history entry.
    pub async fn history(&self) -> Vec<NotificationHistoryEntry> {
        self.tables.read().await.history.clone()
    }

    /// Every alert.
    pub async fn alerts(&self) -> Vec<Alert> {
        self.tables.read().await.alerts.clone()
    }

    /// Every push subscription, active or not.
    pub async fn subscriptions(&self) -> Vec<PushSubscription> {
        self.tables.read().await.subscriptions.clone()
    }

    /// Every recorded position.
    pub async fn recorded_locations(&self) -> Vec<NewUserLocation> {
        self.tables.read().await.locations.clone()
    }

    /// Every location reminder.
    pub async fn location_reminders(&self) -> Vec<LocationReminder> {
        self.tables.read().await.location_reminders.clone()
    }

    /// Every persisted compliance report.
    pub async fn reports(&self) -> Vec<ComplianceReport> {
        self.tables.read().await.reports.clone()
    }

    fn require_notifications(&self) -> AppResult<()> {
        if self.schema.notifications_missing {
            return Err(AppError::schema_missing("relation \"notifications\" does not exist"));
        }
        Ok(())
    }

    fn require_push(&self) -> AppResult<()> {
        if self.schema.push_missing {
            return Err(AppError::schema_missing(
                "relation \"push_subscriptions\" does not exist",
            ));
        }
        Ok(())
    }

    fn require_location(&self) -> AppResult<()> {
        if self.schema.location_missing {
            return Err(AppError::schema_missing(
                "relation \"location_reminders\" does not exist",
            ));
        }
        Ok(())
    }

    fn check_insert(&self, new: &NewNotification) -> AppResult<()> {
        self.require_notifications()?;
        if self.failing_users.contains(&new.user_id) {
            return Err(AppError::database("simulated insert failure"));
        }
        Ok(())
    }
}

fn matches_filter(n: &Notification, filter: &NotificationFilter) -> bool {
    let date = n.created_at.date_naive();
    filter
        .notification_type
        .as_deref()
        .is_none_or(|t| n.notification_type == t)
        && filter.start_date.is_none_or(|d| date >= d)
        && filter.end_date.is_none_or(|d| date <= d)
        && filter.status.is_none_or(|s| match s {
            ReadState::Read => n.is_read,
            ReadState::Unread => !n.is_read,
        })
        && filter.priority.as_deref().is_none_or(|p| n.priority == p)
        && filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .is_none_or(|t| {
                let t = t.to_lowercase();
                n.title.to_lowercase().contains(&t) || n.body.to_lowercase().contains(&t)
            })
}

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 60.0
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[async_trait]
impl NotificationStore for MemoryRecordStore {
    async fn insert_rich(&self, new: &NewNotification) -> AppResult<Uuid> {
        self.check_insert(new)?;
        if self.schema.legacy_notifications {
            return Err(AppError::schema_missing(
                "column \"sound_file\" of relation \"notifications\" does not exist",
            ));
        }
        let (entity_type, entity_id) = new
            .related_entity
            .clone()
            .map(|e| (Some(e.entity_type), Some(e.entity_id)))
            .unwrap_or_default();
        self.tables.write().await.notifications.push(Notification {
            id: new.id,
            user_id: new.user_id,
            notification_type: new.kind.as_str().to_string(),
            title: new.title.clone(),
            body: new.body.clone(),
            priority: new.priority.as_str().to_string(),
            is_read: false,
            read_at: None,
            push_sent: false,
            sent_at: None,
            sound_file: Some(new.sound.file_name().to_string()),
            sound_enabled: new.channels.sound,
            vibration_enabled: new.channels.vibration,
            push_enabled: new.channels.push,
            related_entity_type: entity_type,
            related_entity_id: entity_id,
            action_url: new.action_url.clone(),
            metadata: Some(
                new.metadata
                    .clone()
                    .unwrap_or_else(|| serde_json::json!({})),
            ),
            created_at: new.created_at,
        });
        Ok(new.id)
    }

    async fn insert_reduced(&self, new: &NewNotification) -> AppResult<Uuid> {
        self.check_insert(new)?;
        let (entity_type, entity_id) = new
            .related_entity
            .clone()
            .map(|e| (Some(e.entity_type), Some(e.entity_id)))
            .unwrap_or_default();
        self.tables.write().await.notifications.push(Notification {
            id: new.id,
            user_id: new.user_id,
            notification_type: new.kind.as_str().to_string(),
            title: new.title.clone(),
            body: new.body.clone(),
            priority: new.priority.as_str().to_string(),
            is_read: false,
            read_at: None,
            push_sent: false,
            sent_at: None,
            sound_file: None,
            sound_enabled: true,
            vibration_enabled: true,
            push_enabled: true,
            related_entity_type: entity_type,
            related_entity_id: entity_id,
            action_url: None,
            metadata: None,
            created_at: Utc::now(),
        });
        Ok(new.id)
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>> {
        self.require_notifications()?;
        Ok(self
            .tables
            .read()
            .await
            .notifications
            .iter()
            .find(|n| n.id == id && n.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> AppResult<Vec<Notification>> {
        self.require_notifications()?;
        let mut rows: Vec<Notification> = self
            .tables
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        self.require_notifications()?;
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id && !n.is_read)
        else {
            return Ok(false);
        };
        row.is_read = true;
        row.read_at = Some(at);
        Ok(true)
    }

    async fn mark_all_read(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        self.require_notifications()?;
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for row in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            row.is_read = true;
            row.read_at = Some(at);
            changed += 1;
        }
        Ok(changed)
    }

    async fn mark_push_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        self.require_notifications()?;
        if self.schema.legacy_notifications {
            return Err(AppError::schema_missing(
                "column \"push_sent\" of relation \"notifications\" does not exist",
            ));
        }
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && !n.push_sent)
        else {
            return Ok(false);
        };
        row.push_sent = true;
        row.sent_at = Some(at);
        Ok(true)
    }

    async fn search(
        &self,
        user_id: Uuid,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.require_notifications()?;
        let mut rows: Vec<Notification> = self
            .tables
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && matches_filter(n, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn type_stats(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<NotificationTypeStats>> {
        self.require_notifications()?;
        let tables = self.tables.read().await;
        let mut groups: BTreeMap<&str, Vec<&Notification>> = BTreeMap::new();
        for n in tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.created_at >= since)
        {
            groups.entry(n.notification_type.as_str()).or_default().push(n);
        }
        let mut stats: Vec<NotificationTypeStats> = groups
            .into_iter()
            .map(|(kind, rows)| {
                let read_minutes: Vec<f64> = rows
                    .iter()
                    .filter_map(|n| n.read_at.map(|r| minutes_between(n.created_at, r)))
                    .collect();
                NotificationTypeStats {
                    notification_type: kind.to_string(),
                    total: rows.len() as i64,
                    read_count: rows.iter().filter(|n| n.is_read).count() as i64,
                    push_sent_count: rows.iter().filter(|n| n.push_sent).count() as i64,
                    avg_read_minutes: mean(&read_minutes),
                }
            })
            .collect();
        stats.sort_by(|a, b| b.total.cmp(&a.total));
        Ok(stats)
    }
}

#[async_trait]
impl NotificationHistoryStore for MemoryRecordStore {
    async fn append(&self, entry: &NewHistoryEntry) -> AppResult<()> {
        self.require_notifications()?;
        self.tables
            .write()
            .await
            .history
            .push(NotificationHistoryEntry {
                id: Uuid::now_v7(),
                notification_id: entry.notification_id,
                user_id: entry.user_id,
                action_type: entry.action.as_str().to_string(),
                channel: entry.channel.as_str().to_string(),
                device_info: entry.device_info.clone(),
                metadata: Some(entry.metadata.clone()),
                action_timestamp: Utc::now(),
            });
        Ok(())
    }

    async fn list_for_notification(
        &self,
        notification_id: Uuid,
    ) -> AppResult<Vec<NotificationHistoryEntry>> {
        Ok(self
            .tables
            .read()
            .await
            .history
            .iter()
            .filter(|h| h.notification_id == notification_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AlertStore for MemoryRecordStore {
    async fn insert(&self, alert: &NewAlert) -> AppResult<Uuid> {
        let id = Uuid::now_v7();
        let (entity_type, entity_id) = alert
            .related_entity
            .clone()
            .map(|e| (Some(e.entity_type), Some(e.entity_id)))
            .unwrap_or_default();
        self.tables.write().await.alerts.push(Alert {
            id,
            patient_id: alert.patient_id,
            alert_type: alert.alert_type.as_str().to_string(),
            severity: alert.severity.as_str().to_string(),
            message: alert.message.clone(),
            related_entity_type: entity_type,
            related_entity_id: entity_id,
            status: AlertStatus::Pending.as_str().to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }
}

#[async_trait]
impl PushSubscriptionStore for MemoryRecordStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        endpoint: &str,
        keys: &SubscriptionKeys,
        device_info: Option<serde_json::Value>,
    ) -> AppResult<Uuid> {
        self.require_push()?;
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .subscriptions
            .iter_mut()
            .find(|s| s.user_id == user_id && s.endpoint == endpoint)
        {
            existing.p256dh_key = keys.p256dh.clone();
            existing.auth_key = keys.auth.clone();
            existing.device_info = device_info;
            existing.is_active = true;
            existing.updated_at = now;
            return Ok(existing.id);
        }
        let id = Uuid::now_v7();
        tables.subscriptions.push(PushSubscription {
            id,
            user_id,
            endpoint: endpoint.to_string(),
            p256dh_key: keys.p256dh.clone(),
            auth_key: keys.auth.clone(),
            device_info,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn active_for_user(&self, user_id: Uuid) -> AppResult<Vec<PushSubscription>> {
        self.require_push()?;
        Ok(self
            .tables
            .read()
            .await
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active)
            .cloned()
            .collect())
    }

    async fn deactivate(&self, subscription_id: Uuid) -> AppResult<()> {
        self.require_push()?;
        let mut tables = self.tables.write().await;
        if let Some(sub) = tables
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription_id)
        {
            sub.is_active = false;
            sub.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn deactivate_by_endpoint(&self, user_id: Uuid, endpoint: &str) -> AppResult<bool> {
        self.require_push()?;
        let mut tables = self.tables.write().await;
        let Some(sub) = tables
            .subscriptions
            .iter_mut()
            .find(|s| s.user_id == user_id && s.endpoint == endpoint && s.is_active)
        else {
            return Ok(false);
        };
        sub.is_active = false;
        sub.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl LocationStore for MemoryRecordStore {
    async fn record_location(&self, location: &NewUserLocation) -> AppResult<Uuid> {
        self.require_location()?;
        self.tables.write().await.locations.push(location.clone());
        Ok(Uuid::now_v7())
    }

    async fn insert_reminder(&self, reminder: &NewLocationReminder) -> AppResult<Uuid> {
        self.require_location()?;
        let id = Uuid::now_v7();
        let now = Utc::now();
        self.tables
            .write()
            .await
            .location_reminders
            .push(LocationReminder {
                id,
                user_id: reminder.user_id,
                location_name: reminder.location_name.clone(),
                latitude: reminder.centre.latitude,
                longitude: reminder.centre.longitude,
                radius_meters: reminder.radius_meters,
                reminder_type: reminder.reminder_type.clone(),
                reminder_message: reminder.reminder_message.clone(),
                trigger_type: reminder.trigger.as_str().to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            });
        Ok(id)
    }

    async fn active_reminders(&self, user_id: Uuid) -> AppResult<Vec<LocationReminder>> {
        self.require_location()?;
        Ok(self
            .tables
            .read()
            .await
            .location_reminders
            .iter()
            .filter(|r| r.user_id == user_id && r.is_active)
            .cloned()
            .collect())
    }

    async fn touch_reminder(&self, reminder_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.require_location()?;
        let mut tables = self.tables.write().await;
        if let Some(r) = tables
            .location_reminders
            .iter_mut()
            .find(|r| r.id == reminder_id)
        {
            r.updated_at = at;
        }
        Ok(())
    }
}

#[async_trait]
impl ClinicalStore for MemoryRecordStore {
    async fn iop_measurements_on(&self, date: NaiveDate) -> AppResult<Vec<IopMeasurement>> {
        Ok(self
            .tables
            .read()
            .await
            .iop
            .iter()
            .filter(|m| m.measurement_date == date)
            .cloned()
            .collect())
    }

    async fn active_reminders_with_schedule(&self) -> AppResult<Vec<MedicationReminder>> {
        Ok(self
            .tables
            .read()
            .await
            .reminders
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn has_taken_record(&self, reminder_id: Uuid, date: NaiveDate) -> AppResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .usage
            .iter()
            .any(|u| u.is_taken_on(reminder_id, date)))
    }

    async fn inventory_ending_by(&self, date: NaiveDate) -> AppResult<Vec<InventoryRow>> {
        Ok(self
            .tables
            .read()
            .await
            .inventory
            .iter()
            .filter(|i| !i.is_depleted && i.expected_end_date <= date)
            .cloned()
            .collect())
    }

    async fn scheduled_appointments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<Appointment>> {
        Ok(self
            .tables
            .read()
            .await
            .appointments
            .iter()
            .filter(|a| {
                a.appointment_status == AppointmentStatus::Scheduled.as_str()
                    && (from..=to).contains(&a.appointment_date)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ComplianceStore for MemoryRecordStore {
    async fn medication_usage(
        &self,
        patient_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<MedicationUsageRow>> {
        let tables = self.tables.read().await;
        let mut by_medication: BTreeMap<(String, Uuid), Vec<&UsageRecord>> = BTreeMap::new();
        for reminder in tables
            .reminders
            .iter()
            .filter(|r| r.patient_id == patient_id && r.is_active)
        {
            let records = by_medication
                .entry((reminder.medication_name.clone(), reminder.medication_id))
                .or_default();
            records.extend(tables.usage.iter().filter(|u| {
                u.reminder_id == reminder.id && u.scheduled_time >= from && u.scheduled_time <= to
            }));
        }

        Ok(by_medication
            .into_iter()
            .map(|((medication_name, medication_id), records)| {
                let count = |status: UsageStatus| {
                    records.iter().filter(|u| u.status == status.as_str()).count() as i64
                };
                let delays: Vec<f64> = records
                    .iter()
                    .filter(|u| u.status == UsageStatus::Delayed.as_str())
                    .filter_map(|u| {
                        u.actual_time
                            .map(|a| (a - u.scheduled_time).num_seconds() as f64 / 60.0)
                    })
                    .collect();
                let days: HashSet<NaiveDate> =
                    records.iter().map(|u| u.scheduled_time.date()).collect();
                MedicationUsageRow {
                    medication_id,
                    medication_name,
                    days_with_records: days.len() as i64,
                    total: records.len() as i64,
                    taken: count(UsageStatus::Taken),
                    skipped: count(UsageStatus::Skipped),
                    delayed: count(UsageStatus::Delayed),
                    avg_delay_minutes: mean(&delays),
                }
            })
            .collect())
    }

    async fn appointment_counts(
        &self,
        patient_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<AppointmentCounts> {
        let tables = self.tables.read().await;
        let rows: Vec<&Appointment> = tables
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient_id && (from..=to).contains(&a.appointment_date))
            .collect();
        let count = |status: AppointmentStatus| {
            rows.iter()
                .filter(|a| a.appointment_status == status.as_str())
                .count() as i64
        };
        Ok(AppointmentCounts {
            total: rows.len() as i64,
            attended: count(AppointmentStatus::Completed),
            missed: count(AppointmentStatus::NoShow),
            cancelled: count(AppointmentStatus::Cancelled),
            rescheduled: count(AppointmentStatus::Rescheduled),
        })
    }

    async fn notification_read_stats(
        &self,
        patient_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<NotificationReadStats>> {
        self.require_notifications()?;
        let tables = self.tables.read().await;
        let mut groups: BTreeMap<&str, Vec<&Notification>> = BTreeMap::new();
        for n in tables
            .notifications
            .iter()
            .filter(|n| n.user_id == patient_id && n.created_at >= from && n.created_at <= to)
        {
            groups.entry(n.notification_type.as_str()).or_default().push(n);
        }
        Ok(groups
            .into_iter()
            .map(|(kind, rows)| {
                let minutes: Vec<f64> = rows
                    .iter()
                    .filter_map(|n| n.read_at.map(|r| minutes_between(n.created_at, r)))
                    .collect();
                NotificationReadStats {
                    notification_type: kind.to_string(),
                    total: rows.len() as i64,
                    read_count: rows.iter().filter(|n| n.is_read).count() as i64,
                    avg_response_minutes: mean(&minutes),
                }
            })
            .collect())
    }

    async fn insert_report(&self, report: &NewComplianceReport) -> AppResult<Uuid> {
        self.tables.write().await.reports.push(ComplianceReport {
            id: report.id,
            patient_id: report.patient_id,
            report_type: report.report_type.as_str().to_string(),
            period_start: report.period_start,
            period_end: report.period_end,
            total_scheduled: report.total_scheduled,
            total_completed: report.total_completed,
            total_missed: report.total_scheduled - report.total_completed,
            compliance_rate: report.compliance_rate,
            grade: report.grade.as_str().to_string(),
            detailed_data: report.detailed_data.clone(),
            recommendations: report.recommendations.clone(),
            generated_at: report.generated_at,
        });
        Ok(report.id)
    }

    async fn report_history(
        &self,
        patient_id: Uuid,
        limit: u32,
    ) -> AppResult<Vec<ComplianceHistoryRow>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&ComplianceReport> = tables
            .reports
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .collect();
        rows.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        Ok(rows
            .into_iter()
            .take(limit as usize)
            .map(|r| ComplianceHistoryRow {
                id: r.id,
                report_type: r.report_type.clone(),
                period_start: r.period_start,
                period_end: r.period_end,
                compliance_rate: r.compliance_rate,
                grade: r.grade.clone(),
                generated_at: r.generated_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtms_entity::notification::{
        ChannelFlags, NotificationKind, NotificationPriority, NotificationSound,
    };

    fn new_notification(user_id: Uuid) -> NewNotification {
        NewNotification {
            id: Uuid::now_v7(),
            user_id,
            kind: NotificationKind::HealthAlert,
            title: "High IOP".into(),
            body: "Check your eye pressure".into(),
            priority: NotificationPriority::High,
            sound: NotificationSound::Emergency,
            channels: ChannelFlags::default(),
            related_entity: None,
            action_url: Some("/iop-measurements".into()),
            metadata: Some(serde_json::json!({"k": "v"})),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mark_read_transitions_once() {
        let store = MemoryRecordStore::new();
        let user = Uuid::new_v4();
        let id = store.insert_rich(&new_notification(user)).await.unwrap();

        let first = Utc::now();
        assert!(store.mark_read(id, user, first).await.unwrap());
        assert!(!store.mark_read(id, user, Utc::now()).await.unwrap());

        let row = store.find(id, user).await.unwrap().unwrap();
        assert!(row.is_read);
        assert_eq!(row.read_at, Some(first));
    }

    #[tokio::test]
    async fn test_legacy_schema_rejects_rich_insert() {
        let store = MemoryRecordStore::new().with_legacy_notifications();
        let err = store
            .insert_rich(&new_notification(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(err.is_schema_missing());
    }

    #[tokio::test]
    async fn test_upsert_updates_keys_in_place() {
        let store = MemoryRecordStore::new();
        let user = Uuid::new_v4();
        let keys = SubscriptionKeys {
            p256dh: "a".into(),
            auth: "b".into(),
        };
        let first = store.upsert(user, "https://push/1", &keys, None).await.unwrap();
        store.deactivate(first).await.unwrap();

        let rotated = SubscriptionKeys {
            p256dh: "c".into(),
            auth: "d".into(),
        };
        let second = store
            .upsert(user, "https://push/1", &rotated, None)
            .await
            .unwrap();
        assert_eq!(first, second);

        let active = store.active_for_user(user).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].p256dh_key, "c");
    }

    #[tokio::test]
    async fn test_search_filters_and_paginates() {
        let store = MemoryRecordStore::new();
        let user = Uuid::new_v4();
        for _ in 0..3 {
            store.insert_rich(&new_notification(user)).await.unwrap();
        }
        let filter = NotificationFilter {
            status: Some(ReadState::Unread),
            search: Some("eye".into()),
            ..Default::default()
        };
        let page = store
            .search(user, &filter, &PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
    }
}
