//! # gtms-push
//!
//! Web Push delivery for GTMS notifications: message encryption
//! (RFC 8291), VAPID authorization (RFC 8292), the HTTP transport
//! (RFC 8030) and the [`DeliveryDispatcher`] that fans a notification out
//! to every active subscription of its recipient.

pub mod dispatcher;
pub mod ece;
pub mod error;
pub mod payload;
pub mod recording;
pub mod transport;
pub mod vapid;

pub use dispatcher::{DeliveryDispatcher, DeliveryResult, DispatchReport, PushContent, SkipReason};
pub use error::PushError;
pub use payload::{PushMessage, PushPayload};
pub use recording::RecordingTransport;
pub use transport::{PushTransport, WebPushTransport};
pub use vapid::VapidSigner;
