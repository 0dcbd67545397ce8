//! # gtms-service
//!
//! Business logic for the GTMS notification core. Services receive their
//! record stores and configuration as `Arc` references at construction
//! time and never mutate shared configuration afterwards.

pub mod compliance;
pub mod context;
pub mod location;
pub mod message;
pub mod notification;
pub mod push;

pub use compliance::{ComplianceEngine, ComplianceReportView};
pub use context::RequestContext;
pub use location::{LocationEvaluator, LocationService};
pub use notification::{
    CreatedNotification, NotificationFactory, NotificationRequest, NotificationService,
};
pub use push::{SubscribeInput, SubscriptionService};
