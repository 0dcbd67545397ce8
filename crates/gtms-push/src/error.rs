//! Push delivery errors.

use gtms_core::error::{AppError, ErrorKind};

/// Failure of a single push delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    /// The push service reported the subscription expired (HTTP 410).
    #[error("Push subscription is gone")]
    Gone,

    /// The push service answered with a non-success status.
    #[error("Push service rejected the message with status {status}")]
    Rejected {
        /// HTTP status returned by the push service.
        status: u16,
    },

    /// The push service did not answer in time.
    #[error("Push delivery timed out")]
    Timeout,

    /// The request never completed.
    #[error("Push transport error: {0}")]
    Transport(String),

    /// The payload could not be encrypted for this subscription.
    #[error("Push encryption error: {0}")]
    Encryption(String),

    /// VAPID keys or subject are unusable.
    #[error("Push configuration error: {0}")]
    Configuration(String),
}

impl PushError {
    /// Whether the subscription should be deactivated.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Gone)
    }

    /// Short label recorded in the delivery history.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gone => "gone",
            Self::Rejected { .. } => "rejected",
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
            Self::Encryption(_) => "encryption",
            Self::Configuration(_) => "configuration",
        }
    }
}

impl From<PushError> for AppError {
    fn from(err: PushError) -> Self {
        let kind = match err {
            PushError::Configuration(_) => ErrorKind::Configuration,
            _ => ErrorKind::ExternalService,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
