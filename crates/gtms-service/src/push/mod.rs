//! Push subscription management.

pub mod subscription;

pub use subscription::{SubscribeInput, SubscriptionService};
