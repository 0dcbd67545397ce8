//! Record-store contracts consumed by the notification pipeline.
//!
//! Each trait covers one table family. PostgreSQL implementations live
//! in [`crate::repositories`]; [`crate::MemoryRecordStore`] implements all
//! of them in process memory.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gtms_core::result::AppResult;
use gtms_core::types::pagination::{PageRequest, PageResponse};
use gtms_entity::alert::NewAlert;
use gtms_entity::clinical::{Appointment, IopMeasurement};
use gtms_entity::compliance::{
    AppointmentCounts, ComplianceHistoryRow, MedicationUsageRow, NewComplianceReport,
    NotificationReadStats,
};
use gtms_entity::location::{LocationReminder, NewLocationReminder, NewUserLocation};
use gtms_entity::medication::{InventoryRow, MedicationReminder};
use gtms_entity::notification::{
    NewHistoryEntry, NewNotification, Notification, NotificationFilter, NotificationHistoryEntry,
    NotificationTypeStats,
};
use gtms_entity::push::{PushSubscription, SubscriptionKeys};

use crate::memory::MemoryRecordStore;
use crate::repositories::{
    AlertRepository, ClinicalRepository, ComplianceRepository, HistoryRepository,
    LocationRepository, NotificationRepository, PushSubscriptionRepository,
};

/// Notification rows.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug {
    /// Insert with every optional column populated.
    async fn insert_rich(&self, new: &NewNotification) -> AppResult<Uuid>;

    /// Insert only the columns every schema version has.
    async fn insert_reduced(&self, new: &NewNotification) -> AppResult<Uuid>;

    /// Fetch one notification owned by `user_id`.
    async fn find(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>>;

    /// Newest-first inbox listing.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> AppResult<Vec<Notification>>;

    /// Set `is_read`. Returns `true` only when this call flipped the flag.
    async fn mark_read(&self, id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> AppResult<bool>;

    /// Mark every unread notification of the user. Returns rows changed.
    async fn mark_all_read(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64>;

    /// Set `push_sent`. Returns `true` only when this call flipped the flag.
    async fn mark_push_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool>;

    /// Filtered, paginated history search.
    async fn search(
        &self,
        user_id: Uuid,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Per-type delivery and read statistics since `since`.
    async fn type_stats(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<NotificationTypeStats>>;
}

/// Append-only notification audit trail.
#[async_trait]
pub trait NotificationHistoryStore: Send + Sync + std::fmt::Debug {
    /// Append one entry.
    async fn append(&self, entry: &NewHistoryEntry) -> AppResult<()>;

    /// Entries for one notification, oldest first.
    async fn list_for_notification(
        &self,
        notification_id: Uuid,
    ) -> AppResult<Vec<NotificationHistoryEntry>>;
}

/// Clinical alerts.
#[async_trait]
pub trait AlertStore: Send + Sync + std::fmt::Debug {
    /// Insert a pending alert.
    async fn insert(&self, alert: &NewAlert) -> AppResult<Uuid>;
}

/// Web Push subscriptions.
#[async_trait]
pub trait PushSubscriptionStore: Send + Sync + std::fmt::Debug {
    /// Insert, or update keys and reactivate on (user, endpoint) conflict.
    async fn upsert(
        &self,
        user_id: Uuid,
        endpoint: &str,
        keys: &SubscriptionKeys,
        device_info: Option<serde_json::Value>,
    ) -> AppResult<Uuid>;

    /// Active subscriptions of a user.
    async fn active_for_user(&self, user_id: Uuid) -> AppResult<Vec<PushSubscription>>;

    /// Mark a subscription inactive.
    async fn deactivate(&self, subscription_id: Uuid) -> AppResult<()>;

    /// Mark the user's subscription for `endpoint` inactive.
    async fn deactivate_by_endpoint(&self, user_id: Uuid, endpoint: &str) -> AppResult<bool>;
}

/// Reported positions and geofence reminders.
#[async_trait]
pub trait LocationStore: Send + Sync + std::fmt::Debug {
    /// Record a reported position.
    async fn record_location(&self, location: &NewUserLocation) -> AppResult<Uuid>;

    /// Create a geofence reminder.
    async fn insert_reminder(&self, reminder: &NewLocationReminder) -> AppResult<Uuid>;

    /// Active reminders owned by the user.
    async fn active_reminders(&self, user_id: Uuid) -> AppResult<Vec<LocationReminder>>;

    /// Bump `updated_at` after a reminder fired.
    async fn touch_reminder(&self, reminder_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

/// Clinical reads for the scheduled checks. Dates are local calendar
/// dates in the configured offset.
#[async_trait]
pub trait ClinicalStore: Send + Sync + std::fmt::Debug {
    /// IOP readings dated `date`.
    async fn iop_measurements_on(&self, date: NaiveDate) -> AppResult<Vec<IopMeasurement>>;

    /// Active medication reminders with their medication names.
    async fn active_reminders_with_schedule(&self) -> AppResult<Vec<MedicationReminder>>;

    /// Whether a `taken` usage record exists for the reminder on `date`.
    async fn has_taken_record(&self, reminder_id: Uuid, date: NaiveDate) -> AppResult<bool>;

    /// Non-depleted inventory expected to run out on or before `date`.
    async fn inventory_ending_by(&self, date: NaiveDate) -> AppResult<Vec<InventoryRow>>;

    /// Scheduled appointments dated within `[from, to]`.
    async fn scheduled_appointments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<Appointment>>;
}

/// Compliance aggregates and report snapshots.
#[async_trait]
pub trait ComplianceStore: Send + Sync + std::fmt::Debug {
    /// Dose outcomes per active medication with `scheduled_time` in
    /// `[from, to]`.
    async fn medication_usage(
        &self,
        patient_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<MedicationUsageRow>>;

    /// Appointment outcomes dated within `[from, to]`.
    async fn appointment_counts(
        &self,
        patient_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<AppointmentCounts>;

    /// Read behaviour per notification type created within `[from, to]`.
    async fn notification_read_stats(
        &self,
        patient_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<NotificationReadStats>>;

    /// Persist a report snapshot.
    async fn insert_report(&self, report: &NewComplianceReport) -> AppResult<Uuid>;

    /// Snapshots newest first.
    async fn report_history(
        &self,
        patient_id: Uuid,
        limit: u32,
    ) -> AppResult<Vec<ComplianceHistoryRow>>;
}

/// Every record store the pipeline needs, bundled for injection.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Notification rows.
    pub notifications: Arc<dyn NotificationStore>,
    /// Audit trail.
    pub history: Arc<dyn NotificationHistoryStore>,
    /// Alerts.
    pub alerts: Arc<dyn AlertStore>,
    /// Push subscriptions.
    pub push: Arc<dyn PushSubscriptionStore>,
    /// Locations and geofences.
    pub locations: Arc<dyn LocationStore>,
    /// Clinical reads.
    pub clinical: Arc<dyn ClinicalStore>,
    /// Compliance aggregates.
    pub compliance: Arc<dyn ComplianceStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            history: Arc::new(HistoryRepository::new(pool.clone())),
            alerts: Arc::new(AlertRepository::new(pool.clone())),
            push: Arc::new(PushSubscriptionRepository::new(pool.clone())),
            locations: Arc::new(LocationRepository::new(pool.clone())),
            clinical: Arc::new(ClinicalRepository::new(pool.clone())),
            compliance: Arc::new(ComplianceRepository::new(pool)),
        }
    }

    /// Every store backed by the same in-memory record store.
    pub fn memory(store: Arc<MemoryRecordStore>) -> Self {
        Self {
            notifications: store.clone(),
            history: store.clone(),
            alerts: store.clone(),
            push: store.clone(),
            locations: store.clone(),
            clinical: store.clone(),
            compliance: store,
        }
    }
}
