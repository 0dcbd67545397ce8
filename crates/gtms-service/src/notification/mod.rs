//! Notification creation and inbox queries.

pub mod factory;
pub mod service;

pub use factory::{CreatedNotification, NotificationFactory, NotificationRequest};
pub use service::{NotificationService, NotificationView, TypeAnalytics};
