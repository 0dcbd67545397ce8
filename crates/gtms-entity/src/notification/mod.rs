//! Notification domain entities.

pub mod filter;
pub mod history;
pub mod kind;
pub mod model;
pub mod sound;
pub mod stats;

pub use filter::{NotificationFilter, ReadState};
pub use history::{DeliveryChannel, HistoryAction, NewHistoryEntry, NotificationHistoryEntry};
pub use kind::{NotificationKind, NotificationPriority};
pub use model::{ChannelFlags, EntityRef, NewNotification, Notification};
pub use sound::NotificationSound;
pub use stats::NotificationTypeStats;
