//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use gtms_core::config::AppConfig;
use gtms_database::{DatabasePool, Stores};
use gtms_push::{DeliveryDispatcher, PushTransport};
use gtms_service::compliance::ComplianceEngine;
use gtms_service::location::{LocationEvaluator, LocationService};
use gtms_service::notification::{NotificationFactory, NotificationService};
use gtms_service::push::SubscriptionService;
use gtms_worker::{TaskRunner, build_runner};

use crate::token::TokenVerifier;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for uptime reporting
    pub started_at: DateTime<Utc>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool; absent when running over the in-memory store
    pub db: Option<DatabasePool>,
    /// Record stores
    pub stores: Stores,
    /// Bearer token verifier
    pub verifier: Arc<TokenVerifier>,

    // ── Services ─────────────────────────────────────────────
    /// Notification creation pipeline
    pub factory: Arc<NotificationFactory>,
    /// Inbox queries
    pub notification_service: Arc<NotificationService>,
    /// Push subscription management
    pub subscription_service: Arc<SubscriptionService>,
    /// Location reports and reminders
    pub location_service: Arc<LocationService>,
    /// Compliance reports
    pub compliance_engine: Arc<ComplianceEngine>,
    /// Scheduled checks
    pub task_runner: Arc<TaskRunner>,
}

impl AppState {
    /// Wire every service over `stores`.
    pub fn new(
        config: AppConfig,
        stores: Stores,
        db: Option<DatabasePool>,
        transport: Option<Arc<dyn PushTransport>>,
    ) -> Self {
        let locale = config.notifications.locale;
        let offset = config.scheduler.offset();

        let dispatcher = Arc::new(DeliveryDispatcher::new(
            stores.push.clone(),
            stores.notifications.clone(),
            stores.history.clone(),
            transport,
            Arc::new(config.push.clone()),
        ));
        let factory = Arc::new(NotificationFactory::new(
            stores.notifications.clone(),
            stores.history.clone(),
            Arc::clone(&dispatcher),
        ));
        let notification_service = Arc::new(NotificationService::new(
            stores.notifications.clone(),
            stores.history.clone(),
            Arc::new(config.notifications.clone()),
        ));
        let subscription_service = Arc::new(SubscriptionService::new(
            stores.push.clone(),
            Arc::clone(&dispatcher),
        ));
        let evaluator = Arc::new(LocationEvaluator::new(
            stores.locations.clone(),
            Arc::clone(&factory),
            config.location.refire_policy,
        ));
        let location_service = Arc::new(LocationService::new(
            stores.locations.clone(),
            evaluator,
            Arc::new(config.location.clone()),
            locale,
        ));
        let compliance_engine = Arc::new(ComplianceEngine::new(
            stores.compliance.clone(),
            offset,
            locale,
        ));
        let task_runner = Arc::new(build_runner(
            &stores,
            Arc::clone(&factory),
            &config.scheduler,
            locale,
        ));

        Self {
            verifier: Arc::new(TokenVerifier::new(&config.auth)),
            config: Arc::new(config),
            started_at: Utc::now(),
            db,
            stores,
            factory,
            notification_service,
            subscription_service,
            location_service,
            compliance_engine,
            task_runner,
        }
    }
}
