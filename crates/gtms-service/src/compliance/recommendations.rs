//! Rules table turning computed rates into actionable tips.

use serde::Serialize;

use gtms_core::config::Locale;

use super::engine::{AppointmentCompliance, OverallMedicationCompliance};

/// One actionable recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub recommendation_type: &'static str,
    pub priority: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub actions: Vec<&'static str>,
}

/// Medication rates below this get high-priority tips.
const MEDICATION_LOW: f64 = 80.0;
/// Medication rates below this (and at or above `MEDICATION_LOW`) get
/// reinforcement tips.
const MEDICATION_GOOD: f64 = 95.0;
/// Attendance rates below this get high-priority tips.
const ATTENDANCE_LOW: f64 = 90.0;

/// Derive recommendations from the sections present in a report.
///
/// A section with nothing scheduled has rate 0 and lands in the lowest band.
pub fn recommend(
    medication: Option<&OverallMedicationCompliance>,
    appointments: Option<&AppointmentCompliance>,
    locale: Locale,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if let Some(med) = medication {
        if med.compliance_rate < MEDICATION_LOW {
            out.push(match locale {
                Locale::Th => Recommendation {
                    recommendation_type: "medication",
                    priority: "high",
                    title: "ปรับปรุงการใช้ยาตามกำหนด",
                    description: "อัตราการใช้ยาตามกำหนดยังไม่เหมาะสม ควรตั้งการแจ้งเตือนเพิ่มเติม",
                    actions: vec![
                        "ตั้งการแจ้งเตือนล่วงหน้า 15 นาที",
                        "เพิ่มการแจ้งเตือนซ้ำทุก 5 นาที",
                        "ใช้ฟีเจอร์การแจ้งเตือนตามสถานที่",
                    ],
                },
                Locale::En => Recommendation {
                    recommendation_type: "medication",
                    priority: "high",
                    title: "Improve medication adherence",
                    description: "Doses are often missed; add more reminders",
                    actions: vec![
                        "Set a reminder 15 minutes ahead",
                        "Repeat the reminder every 5 minutes",
                        "Use location-based reminders",
                    ],
                },
            });
        } else if med.compliance_rate < MEDICATION_GOOD {
            out.push(match locale {
                Locale::Th => Recommendation {
                    recommendation_type: "medication",
                    priority: "medium",
                    title: "การใช้ยาอยู่ในเกณฑ์ดี",
                    description: "คงความสม่ำเสมอในการใช้ยาต่อไป",
                    actions: vec![
                        "ทบทวนเวลาการแจ้งเตือนให้เหมาะสมกับกิจวัตร",
                        "ติดตามผลการรักษาอย่างสม่ำเสมอ",
                    ],
                },
                Locale::En => Recommendation {
                    recommendation_type: "medication",
                    priority: "medium",
                    title: "Medication adherence is good",
                    description: "Keep taking your doses consistently",
                    actions: vec![
                        "Align reminder times with your daily routine",
                        "Keep following up on treatment results",
                    ],
                },
            });
        }
    }

    let low_attendance = appointments.is_some_and(|a| a.attendance_rate < ATTENDANCE_LOW);
    if low_attendance {
        out.push(match locale {
            Locale::Th => Recommendation {
                recommendation_type: "appointment",
                priority: "high",
                title: "ปรับปรุงการเข้ารับการรักษาตามนัด",
                description: "ควรเข้ารับการรักษาตามนัดอย่างสม่ำเสมอ",
                actions: vec![
                    "ตั้งการแจ้งเตือนล่วงหน้า 3 วัน",
                    "เพิ่มการแจ้งเตือนในวันนัดหมาย",
                    "ประสานงานกับทีมแพทย์หากมีข้อจำกัด",
                ],
            },
            Locale::En => Recommendation {
                recommendation_type: "appointment",
                priority: "high",
                title: "Improve appointment attendance",
                description: "Attend scheduled appointments consistently",
                actions: vec![
                    "Set a reminder 3 days ahead",
                    "Add a reminder on the appointment day",
                    "Contact the care team if a date does not work",
                ],
            },
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtms_entity::compliance::ComplianceGrade;

    fn med(rate: f64) -> OverallMedicationCompliance {
        OverallMedicationCompliance {
            total_reminders: 10,
            total_taken: 0,
            compliance_rate: rate,
            grade: ComplianceGrade::from_rate(rate),
        }
    }

    fn appt(rate: f64) -> AppointmentCompliance {
        AppointmentCompliance {
            total_appointments: 4,
            attended: 0,
            missed: 0,
            cancelled: 0,
            rescheduled: 0,
            attendance_rate: rate,
        }
    }

    #[test]
    fn test_medication_bands() {
        let low = recommend(Some(&med(79.99)), None, Locale::En);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].priority, "high");
        assert_eq!(low[0].actions.len(), 3);

        let mid = recommend(Some(&med(80.0)), None, Locale::En);
        assert_eq!(mid[0].priority, "medium");
        assert_eq!(mid[0].actions.len(), 2);

        assert!(recommend(Some(&med(95.0)), None, Locale::En).is_empty());
    }

    #[test]
    fn test_attendance_band() {
        let recs = recommend(None, Some(&appt(75.0)), Locale::Th);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].recommendation_type, "appointment");
        assert!(recommend(None, Some(&appt(90.0)), Locale::Th).is_empty());
    }

    #[test]
    fn test_empty_period_gets_low_band_tips() {
        let mut no_doses = med(0.0);
        no_doses.total_reminders = 0;
        let mut no_visits = appt(0.0);
        no_visits.total_appointments = 0;

        let recs = recommend(Some(&no_doses), Some(&no_visits), Locale::En);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].recommendation_type, "medication");
        assert_eq!(recs[0].priority, "high");
        assert_eq!(recs[1].recommendation_type, "appointment");
    }

    #[test]
    fn test_serializes_type_key() {
        let recs = recommend(Some(&med(50.0)), None, Locale::En);
        let json = serde_json::to_value(&recs[0]).unwrap();
        assert_eq!(json["type"], "medication");
    }
}
