//! Notification sound selection.

use serde::{Deserialize, Serialize};

use super::kind::NotificationKind;

/// The fixed set of sound assets a notification can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSound {
    /// Medication reminders.
    Medication,
    /// Appointment reminders.
    Appointment,
    /// Health and emergency alerts.
    Emergency,
    /// Everything else.
    General,
    /// High intraocular pressure warnings.
    IopWarning,
}

impl NotificationSound {
    /// Every sound asset, in a stable order.
    pub const ALL: [NotificationSound; 5] = [
        Self::Medication,
        Self::Appointment,
        Self::Emergency,
        Self::General,
        Self::IopWarning,
    ];

    /// Select the sound for a notification type. Total over all kinds.
    pub fn for_kind(kind: &NotificationKind) -> Self {
        match kind {
            NotificationKind::MedicationReminder => Self::Medication,
            NotificationKind::AppointmentReminder => Self::Appointment,
            NotificationKind::HealthAlert | NotificationKind::EmergencyAlert => Self::Emergency,
            NotificationKind::HighIop => Self::IopWarning,
            _ => Self::General,
        }
    }

    /// File name of the asset.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Medication => "medication-reminder.mp3",
            Self::Appointment => "appointment-alert.mp3",
            Self::Emergency => "emergency-alert.mp3",
            Self::General => "general-notification.mp3",
            Self::IopWarning => "iop-warning.mp3",
        }
    }

    /// Key used when listing the available sounds to clients.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Medication => "medication",
            Self::Appointment => "appointment",
            Self::Emergency => "emergency",
            Self::General => "general",
            Self::IopWarning => "iop_alert",
        }
    }

    /// Resolve an asset by exact file name. Anything outside the fixed
    /// set (including path segments) resolves to `None`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.file_name() == name)
    }
}
