//! Push subscription entities.

pub mod subscription;

pub use subscription::{PushSubscription, SubscriptionKeys};
