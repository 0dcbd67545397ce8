//! Localized notification text for the automated checks.
//!
//! Alert records always carry English text; notification titles and
//! bodies follow the configured [`Locale`].

use chrono::{NaiveDate, NaiveTime};

use gtms_core::config::Locale;

/// A rendered notification title and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub body: String,
}

impl Message {
    fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

fn mmhg(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Alert text for an elevated IOP reading.
pub fn high_iop_alert(left: Option<f64>, right: Option<f64>) -> String {
    format!(
        "High IOP detected: Left eye {} mmHg, Right eye {} mmHg",
        mmhg(left),
        mmhg(right)
    )
}

/// Notification for an elevated IOP reading.
pub fn high_iop(locale: Locale, left: Option<f64>, right: Option<f64>) -> Message {
    let (l, r) = (mmhg(left), mmhg(right));
    match locale {
        Locale::Th => Message::new(
            "ค่าความดันลูกตาสูง",
            format!("ค่าความดันลูกตาสูงกว่าปกติ: ตาซ้าย {l} mmHg, ตาขวา {r} mmHg"),
        ),
        Locale::En => Message::new(
            "High eye pressure",
            format!("Eye pressure above normal: left {l} mmHg, right {r} mmHg"),
        ),
    }
}

/// Alert text for a dose not recorded as taken.
pub fn missed_medication_alert(medication: &str, scheduled: NaiveTime) -> String {
    format!("Missed medication: {medication} scheduled at {}", clock(scheduled))
}

/// Notification for a dose not recorded as taken.
pub fn missed_medication(locale: Locale, medication: &str, scheduled: NaiveTime) -> Message {
    let at = clock(scheduled);
    match locale {
        Locale::Th => Message::new(
            "ยังไม่ได้หยอดยา",
            format!("ยังไม่ได้หยอดยา {medication} ตามเวลาที่กำหนด ({at})"),
        ),
        Locale::En => Message::new(
            "Dose not taken yet",
            format!("{medication} was due at {at} and has not been recorded"),
        ),
    }
}

/// Notification for a medication about to run out.
pub fn low_inventory(locale: Locale, medication: &str, days_left: i64) -> Message {
    match locale {
        Locale::Th => Message::new(
            "ยาใกล้หมด",
            format!("ยา {medication} เหลืออีก {days_left} วัน กรุณาเตรียมซื้อยาใหม่"),
        ),
        Locale::En => Message::new(
            "Medication running low",
            format!("{medication} runs out in {days_left} day(s); please arrange a refill"),
        ),
    }
}

/// Notification for an upcoming appointment `days_until` days ahead.
pub fn appointment(
    locale: Locale,
    days_until: i64,
    doctor: Option<&str>,
    date: NaiveDate,
    time: NaiveTime,
) -> Message {
    let at = clock(time);
    match locale {
        Locale::Th => {
            let with = doctor.map_or_else(|| "แพทย์".to_string(), |d| format!(" {d}"));
            match days_until {
                0 => Message::new(
                    "🏥 วันนี้มีนัดหมาย",
                    format!("วันนี้คุณมีนัดหมายกับ{with} เวลา {at}"),
                ),
                1 => Message::new(
                    "📋 พรุ่งนี้มีนัดหมาย",
                    format!("พรุ่งนี้คุณมีนัดหมายกับ{with} เวลา {at}"),
                ),
                n => Message::new(
                    format!("📅 อีก {n} วัน มีนัดหมาย"),
                    format!("อีก {n} วัน คุณมีนัดหมายกับ{with} วันที่ {date}"),
                ),
            }
        }
        Locale::En => {
            let with = doctor.unwrap_or("your doctor");
            match days_until {
                0 => Message::new(
                    "🏥 Appointment today",
                    format!("You have an appointment with {with} today at {at}"),
                ),
                1 => Message::new(
                    "📋 Appointment tomorrow",
                    format!("You have an appointment with {with} tomorrow at {at}"),
                ),
                n => Message::new(
                    format!("📅 Appointment in {n} days"),
                    format!("You have an appointment with {with} in {n} days, on {date}"),
                ),
            }
        }
    }
}

/// Notification for entering a location reminder's geofence.
pub fn location(location_name: &str, reminder_message: &str) -> Message {
    Message::new(format!("📍 {location_name}"), reminder_message)
}
