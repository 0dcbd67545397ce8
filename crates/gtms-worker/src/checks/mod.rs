//! Scheduled scans.

pub mod appointment;
pub mod high_iop;
pub mod low_inventory;
pub mod missed_medication;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;

use gtms_core::config::{Locale, SchedulerConfig};
use gtms_core::error::AppError;
use gtms_database::store::Stores;
use gtms_service::notification::NotificationFactory;

pub use appointment::AppointmentReminderCheck;
pub use high_iop::HighIopCheck;
pub use low_inventory::LowInventoryCheck;
pub use missed_medication::MissedMedicationCheck;

use crate::runner::TaskRunner;

/// A periodically invoked scan.
#[async_trait]
pub trait ScheduledCheck: Send + Sync + std::fmt::Debug {
    /// Stable task name.
    fn name(&self) -> &'static str;

    /// Run one scan. `now` is local wall-clock time in the configured
    /// offset.
    async fn run(&self, now: NaiveDateTime) -> Result<CheckOutcome, CheckError>;
}

/// Counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Rows returned by the store.
    pub scanned: u32,
    /// Notifications created.
    pub created: u32,
    /// Rows that could not be fully processed.
    pub failures: u32,
}

/// Error that aborts a whole scan.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The candidate rows could not be read.
    #[error("Storage error: {0}")]
    Storage(#[from] AppError),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CheckError> for AppError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::Storage(e) => e,
            CheckError::Internal(msg) => AppError::internal(msg),
        }
    }
}

/// Register the four checks with their configured cadences.
pub fn build_runner(
    stores: &Stores,
    factory: Arc<NotificationFactory>,
    config: &SchedulerConfig,
    locale: Locale,
) -> TaskRunner {
    let mut runner = TaskRunner::new(config.offset());
    runner.register(
        Arc::new(HighIopCheck::new(
            stores.clinical.clone(),
            stores.alerts.clone(),
            factory.clone(),
            config.iop_threshold_mmhg,
            locale,
        )),
        &config.high_iop_cron,
    );
    runner.register(
        Arc::new(MissedMedicationCheck::new(
            stores.clinical.clone(),
            stores.alerts.clone(),
            factory.clone(),
            config.missed_grace_minutes,
            locale,
        )),
        &config.missed_medication_cron,
    );
    runner.register(
        Arc::new(LowInventoryCheck::new(
            stores.clinical.clone(),
            factory.clone(),
            config.inventory_lookahead_days,
            locale,
        )),
        &config.low_inventory_cron,
    );
    runner.register(
        Arc::new(AppointmentReminderCheck::new(
            stores.clinical.clone(),
            factory,
            config.appointment_window_start,
            config.appointment_window_end,
            locale,
        )),
        &config.appointment_cron,
    );
    runner
}
