//! Medication reminder schedule.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Set of weekdays a reminder is active on.
///
/// Parsed from the stored comma-separated list where Monday is `0` and
/// Sunday is `6`. An empty list means every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    /// Every day of the week.
    pub const EVERY_DAY: DaysOfWeek = DaysOfWeek(0b111_1111);

    /// Parse the stored CSV. Unparseable entries are ignored; a list with
    /// no valid entries means every day.
    pub fn parse(csv: Option<&str>) -> Self {
        let bits = csv
            .unwrap_or_default()
            .split(',')
            .filter_map(|part| part.trim().parse::<u8>().ok())
            .filter(|day| *day < 7)
            .fold(0u8, |acc, day| acc | (1 << day));
        if bits == 0 { Self::EVERY_DAY } else { Self(bits) }
    }

    /// Whether the weekday is included.
    pub fn includes(&self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_monday()) != 0
    }
}

/// An active reminder joined with its medication name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MedicationReminder {
    /// Reminder identifier.
    pub id: Uuid,
    /// Patient.
    pub patient_id: Uuid,
    /// Prescription this reminder belongs to.
    pub prescription_id: Option<Uuid>,
    /// Medication.
    pub medication_id: Uuid,
    /// Medication display name.
    pub medication_name: String,
    /// Local time of day the dose is due.
    pub reminder_time: NaiveTime,
    /// Weekday CSV (Monday = 0).
    pub days_of_week: Option<String>,
    /// First day the reminder applies.
    pub start_date: Option<NaiveDate>,
    /// Last day the reminder applies.
    pub end_date: Option<NaiveDate>,
    /// Eye the drops are for (`left`, `right`, `both`).
    pub eye: Option<String>,
    /// Dose description.
    pub dose: Option<String>,
    /// Channels the patient asked for, CSV.
    pub channels: Option<String>,
    /// Whether the reminder is active.
    pub is_active: bool,
}

impl MedicationReminder {
    /// Whether a dose is scheduled on `date`.
    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        let in_range = self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end);
        self.is_active
            && in_range
            && DaysOfWeek::parse(self.days_of_week.as_deref()).includes(date.weekday())
    }

    /// Whether the dose scheduled on `now`'s date is past its grace
    /// window. A deadline that would spill into the next day never
    /// counts as overdue.
    pub fn is_overdue(&self, now: NaiveDateTime, grace: Duration) -> bool {
        let (deadline, wrapped) = self.reminder_time.overflowing_add_signed(grace);
        wrapped == 0 && now.time() >= deadline
    }

    /// The scheduled moment of today's dose.
    pub fn scheduled_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.reminder_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(time: (u32, u32), days: Option<&str>) -> MedicationReminder {
        MedicationReminder {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            prescription_id: None,
            medication_id: Uuid::new_v4(),
            medication_name: "Latanoprost".into(),
            reminder_time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
            days_of_week: days.map(str::to_string),
            start_date: None,
            end_date: None,
            eye: Some("both".into()),
            dose: Some("1 drop".into()),
            channels: None,
            is_active: true,
        }
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_days_of_week_monday_is_zero() {
        let days = DaysOfWeek::parse(Some("0,2, 4"));
        assert!(days.includes(Weekday::Mon));
        assert!(!days.includes(Weekday::Tue));
        assert!(days.includes(Weekday::Wed));
        assert!(days.includes(Weekday::Fri));
        assert!(!days.includes(Weekday::Sun));
    }

    #[test]
    fn test_empty_days_means_every_day() {
        assert_eq!(DaysOfWeek::parse(None), DaysOfWeek::EVERY_DAY);
        assert_eq!(DaysOfWeek::parse(Some("")), DaysOfWeek::EVERY_DAY);
        assert_eq!(DaysOfWeek::parse(Some("9,x")), DaysOfWeek::EVERY_DAY);
    }

    #[test]
    fn test_overdue_after_grace() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let r = reminder((8, 0), None);
        let grace = Duration::minutes(15);
        assert!(!r.is_overdue(at(date, 8, 14), grace));
        assert!(r.is_overdue(at(date, 8, 15), grace));
        assert!(r.is_overdue(at(date, 12, 0), grace));
    }

    #[test]
    fn test_late_evening_deadline_does_not_wrap() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let r = reminder((23, 50), None);
        assert!(!r.is_overdue(at(date, 0, 10), Duration::minutes(15)));
        assert!(!r.is_overdue(at(date, 23, 59), Duration::minutes(15)));
    }

    #[test]
    fn test_schedule_respects_weekday_and_range() {
        // 2024-06-03 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut r = reminder((8, 0), Some("1,2"));
        assert!(!r.is_scheduled_on(monday));
        assert!(r.is_scheduled_on(monday.succ_opt().unwrap()));
        r.days_of_week = None;
        r.end_date = NaiveDate::from_ymd_opt(2024, 6, 2);
        assert!(!r.is_scheduled_on(monday));
    }
}
