//! Localized display labels returned next to stored enum values.

use gtms_core::config::Locale;

use crate::location::TriggerMode;
use crate::notification::{NotificationKind, NotificationPriority};

/// Label for a notification type. Unknown types echo the stored value.
pub fn notification_type_label(kind: &NotificationKind, locale: Locale) -> String {
    let label = match (kind, locale) {
        (NotificationKind::MedicationReminder, Locale::Th) => "แจ้งเตือนยา",
        (NotificationKind::MedicationReminder, Locale::En) => "Medication reminder",
        (NotificationKind::AppointmentReminder, Locale::Th) => "แจ้งเตือนนัดหมาย",
        (NotificationKind::AppointmentReminder, Locale::En) => "Appointment reminder",
        (NotificationKind::HealthAlert, Locale::Th) => "แจ้งเตือนสุขภาพ",
        (NotificationKind::HealthAlert, Locale::En) => "Health alert",
        (NotificationKind::MedicationInventory, Locale::Th) => "แจ้งเตือนยาใกล้หมด",
        (NotificationKind::MedicationInventory, Locale::En) => "Medication running low",
        (NotificationKind::EmergencyAlert, Locale::Th) => "แจ้งเตือนฉุกเฉิน",
        (NotificationKind::EmergencyAlert, Locale::En) => "Emergency alert",
        (NotificationKind::SystemAnnouncement, Locale::Th) => "ประกาศระบบ",
        (NotificationKind::SystemAnnouncement, Locale::En) => "System announcement",
        (NotificationKind::LocationReminder, Locale::Th) => "แจ้งเตือนตามสถานที่",
        (NotificationKind::LocationReminder, Locale::En) => "Location reminder",
        (NotificationKind::HighIop, Locale::Th) => "ความดันลูกตาสูง",
        (NotificationKind::HighIop, Locale::En) => "High eye pressure",
        (NotificationKind::Other(raw), _) => return raw.clone(),
    };
    label.to_string()
}

/// Label for a stored priority value. Unknown values echo the input.
pub fn priority_label(priority: &str, locale: Locale) -> String {
    let Some(parsed) = NotificationPriority::parse(priority) else {
        return priority.to_string();
    };
    let label = match (parsed, locale) {
        (NotificationPriority::Low, Locale::Th) => "ต่ำ",
        (NotificationPriority::Medium, Locale::Th) => "ปานกลาง",
        (NotificationPriority::High, Locale::Th) => "สูง",
        (NotificationPriority::Urgent, Locale::Th) => "ด่วน",
        (NotificationPriority::Low, Locale::En) => "Low",
        (NotificationPriority::Medium, Locale::En) => "Medium",
        (NotificationPriority::High, Locale::En) => "High",
        (NotificationPriority::Urgent, Locale::En) => "Urgent",
    };
    label.to_string()
}

/// Label for a location reminder category.
pub fn reminder_type_label(reminder_type: &str, locale: Locale) -> String {
    let label = match (reminder_type, locale) {
        ("medication", Locale::Th) => "เตือนการใช้ยา",
        ("medication", Locale::En) => "Medication reminder",
        ("appointment", Locale::Th) => "เตือนการนัดหมาย",
        ("appointment", Locale::En) => "Appointment reminder",
        ("general", Locale::Th) => "เตือนทั่วไป",
        ("general", Locale::En) => "General reminder",
        (other, _) => other,
    };
    label.to_string()
}

/// Label for a trigger mode value.
pub fn trigger_type_label(trigger_type: &str, locale: Locale) -> String {
    let Some(mode) = TriggerMode::parse(trigger_type) else {
        return trigger_type.to_string();
    };
    let label = match (mode, locale) {
        (TriggerMode::Enter, Locale::Th) => "เมื่อเข้าสถานที่",
        (TriggerMode::Exit, Locale::Th) => "เมื่อออกจากสถานที่",
        (TriggerMode::Both, Locale::Th) => "เข้าและออก",
        (TriggerMode::Enter, Locale::En) => "On arrival",
        (TriggerMode::Exit, Locale::En) => "On departure",
        (TriggerMode::Both, Locale::En) => "On arrival and departure",
    };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thai_labels_are_default() {
        assert_eq!(
            notification_type_label(&NotificationKind::MedicationReminder, Locale::default()),
            "แจ้งเตือนยา"
        );
        assert_eq!(priority_label("urgent", Locale::Th), "ด่วน");
        assert_eq!(trigger_type_label("both", Locale::Th), "เข้าและออก");
    }

    #[test]
    fn test_unknown_values_echo() {
        let kind = NotificationKind::parse("weekly_digest");
        assert_eq!(notification_type_label(&kind, Locale::En), "weekly_digest");
        assert_eq!(priority_label("critical", Locale::En), "critical");
        assert_eq!(reminder_type_label("exercise", Locale::Th), "exercise");
    }
}
