//! Notification type and priority enumerations.

use serde::{Deserialize, Serialize};

/// Semantic type of a notification.
///
/// Unknown type strings are preserved in [`NotificationKind::Other`] so a
/// caller can still create the notification; they simply get the general
/// sound and no special display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    /// A dose is due or was missed.
    MedicationReminder,
    /// An appointment is coming up.
    AppointmentReminder,
    /// A clinical reading needs attention.
    HealthAlert,
    /// Medication stock is running out.
    MedicationInventory,
    /// An emergency message.
    EmergencyAlert,
    /// A system-wide announcement.
    SystemAnnouncement,
    /// A geofence reminder fired.
    LocationReminder,
    /// A raw high-pressure alert.
    HighIop,
    /// Any other type string.
    Other(String),
}

impl NotificationKind {
    /// All known (non-`Other`) kinds.
    pub const KNOWN: [NotificationKind; 8] = [
        Self::MedicationReminder,
        Self::AppointmentReminder,
        Self::HealthAlert,
        Self::MedicationInventory,
        Self::EmergencyAlert,
        Self::SystemAnnouncement,
        Self::LocationReminder,
        Self::HighIop,
    ];

    /// Parse a stored type string. Never fails.
    pub fn parse(value: &str) -> Self {
        match value {
            "medication_reminder" => Self::MedicationReminder,
            "appointment_reminder" => Self::AppointmentReminder,
            "health_alert" => Self::HealthAlert,
            "medication_inventory" => Self::MedicationInventory,
            "emergency_alert" => Self::EmergencyAlert,
            "system_announcement" => Self::SystemAnnouncement,
            "location_reminder" => Self::LocationReminder,
            "high_iop" => Self::HighIop,
            other => Self::Other(other.to_string()),
        }
    }

    /// Return the type as stored.
    pub fn as_str(&self) -> &str {
        match self {
            Self::MedicationReminder => "medication_reminder",
            Self::AppointmentReminder => "appointment_reminder",
            Self::HealthAlert => "health_alert",
            Self::MedicationInventory => "medication_inventory",
            Self::EmergencyAlert => "emergency_alert",
            Self::SystemAnnouncement => "system_announcement",
            Self::LocationReminder => "location_reminder",
            Self::HighIop => "high_iop",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for NotificationKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery priority of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Informational.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// Needs attention soon.
    High,
    /// Needs attention now.
    Urgent,
}

impl NotificationPriority {
    /// Parse a stored priority string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    /// Return the priority as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// RFC 8030 `Urgency` header value.
    pub fn push_urgency(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "normal",
            Self::High | Self::Urgent => "high",
        }
    }
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_known_kinds() {
        for kind in NotificationKind::KNOWN {
            assert_eq!(NotificationKind::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let kind = NotificationKind::parse("weekly_digest");
        assert_eq!(kind, NotificationKind::Other("weekly_digest".into()));
        assert_eq!(kind.as_str(), "weekly_digest");
    }

    #[test]
    fn test_kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&NotificationKind::HealthAlert).unwrap();
        assert_eq!(json, "\"health_alert\"");
    }

    #[test]
    fn test_priority_urgency() {
        assert_eq!(NotificationPriority::Medium.push_urgency(), "normal");
        assert_eq!(NotificationPriority::Urgent.push_urgency(), "high");
        assert_eq!(NotificationPriority::parse("urgent"), Some(NotificationPriority::Urgent));
        assert_eq!(NotificationPriority::parse("critical"), None);
    }
}
