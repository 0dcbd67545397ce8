//! Integration tests for compliance reports.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use gtms_database::MemoryRecordStore;
use gtms_entity::clinical::Appointment;
use gtms_entity::medication::{MedicationReminder, UsageRecord};

fn local_today() -> NaiveDate {
    (Utc::now() + Duration::minutes(420)).date_naive()
}

fn at(date: NaiveDate, h: u32) -> chrono::NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(h, 0, 0).unwrap())
}

fn reminder(patient_id: Uuid, name: &str) -> MedicationReminder {
    MedicationReminder {
        id: Uuid::new_v4(),
        patient_id,
        prescription_id: None,
        medication_id: Uuid::new_v4(),
        medication_name: name.to_string(),
        reminder_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        days_of_week: None,
        start_date: None,
        end_date: None,
        eye: Some("both".into()),
        dose: Some("1 drop".into()),
        channels: None,
        is_active: true,
    }
}

fn usage(reminder: &MedicationReminder, days_ago: i64, status: &str) -> UsageRecord {
    let due = at(local_today() - Duration::days(days_ago), 8);
    UsageRecord {
        id: Uuid::new_v4(),
        reminder_id: reminder.id,
        patient_id: reminder.patient_id,
        scheduled_time: due,
        actual_time: (status != "skipped").then(|| due + Duration::minutes(20)),
        status: status.to_string(),
    }
}

fn appointment(patient_id: Uuid, days_ago: i64, status: &str) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_id,
        appointment_date: local_today() - Duration::days(days_ago),
        appointment_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        appointment_type: Some("follow_up".into()),
        doctor_name: Some("Dr. Somchai".into()),
        location: None,
        appointment_status: status.to_string(),
    }
}

/// Three of four Timolol doses taken, one of two visits attended.
async fn seeded() -> (helpers::TestApp, String) {
    let store = MemoryRecordStore::new();
    let patient_id = Uuid::new_v4();
    let timolol = reminder(patient_id, "Timolol");
    store.add_medication_reminder(timolol.clone()).await;
    for (days_ago, status) in [(1, "taken"), (2, "taken"), (3, "taken"), (4, "skipped")] {
        store.add_usage_record(usage(&timolol, days_ago, status)).await;
    }
    store.add_appointment(appointment(patient_id, 5, "completed")).await;
    store.add_appointment(appointment(patient_id, 10, "no_show")).await;

    let app = helpers::TestApp::with_store(store).await;
    let token = app.token(patient_id, &app.config.auth.patient_role);
    (app, token)
}

#[tokio::test]
async fn test_overall_report_is_computed_and_persisted() {
    let (app, token) = seeded().await;

    let response = app
        .request("GET", "/api/patient/compliance-report", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["report_type"], "overall");
    assert_eq!(data["period_days"], 30);

    let meds = data["medication_compliance"].as_array().unwrap();
    assert_eq!(meds.len(), 1);
    assert_eq!(meds[0]["medication_name"], "Timolol");
    assert_eq!(meds[0]["total_doses"], 4);
    assert_eq!(meds[0]["taken"], 3);
    assert_eq!(meds[0]["skipped"], 1);
    assert_eq!(meds[0]["compliance_rate"], 75.0);
    assert_eq!(meds[0]["grade"], "fair");

    assert_eq!(data["overall_medication_compliance"]["compliance_rate"], 75.0);
    assert_eq!(data["appointment_compliance"]["total_appointments"], 2);
    assert_eq!(data["appointment_compliance"]["attendance_rate"], 50.0);
    assert!(data["notification_compliance"].is_array());

    let recommendations = data["recommendations"].as_array().unwrap();
    assert!(recommendations.iter().any(|r| r["type"] == "medication" && r["priority"] == "high"));
    assert!(recommendations.iter().any(|r| r["type"] == "appointment"));

    assert!(data["report_id"].is_string());
    let reports = app.store.reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].grade, "fair");
    assert_eq!(reports[0].total_scheduled, 4);
    assert_eq!(reports[0].total_completed, 3);
}

#[tokio::test]
async fn test_sectioned_report_is_not_persisted() {
    let (app, token) = seeded().await;

    let response = app
        .request(
            "GET",
            "/api/patient/compliance-report?type=medication&period=7",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["report_type"], "medication");
    assert!(data.get("appointment_compliance").is_none());
    assert!(data.get("report_id").is_none());
    assert!(app.store.reports().await.is_empty());
}

#[tokio::test]
async fn test_report_rejects_bad_type_and_period() {
    let (app, token) = seeded().await;

    let response = app
        .request(
            "GET",
            "/api/patient/compliance-report?type=weekly",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("INVALID_REPORT_TYPE"));

    let response = app
        .request(
            "GET",
            "/api/patient/compliance-report?period=0",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("INVALID_PERIOD"));
}

#[tokio::test]
async fn test_empty_patient_gets_lowest_band_recommendations() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.patient();

    let response = app
        .request("GET", "/api/patient/compliance-report", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["medication_compliance"].as_array().unwrap().len(), 0);
    assert_eq!(data["overall_medication_compliance"]["compliance_rate"], 0.0);
    let recommendations = data["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0]["type"], "medication");
    assert_eq!(recommendations[0]["priority"], "high");
    assert_eq!(recommendations[1]["type"], "appointment");
}

#[tokio::test]
async fn test_history_lists_newest_first() {
    let (app, token) = seeded().await;
    for _ in 0..2 {
        app.request("GET", "/api/patient/compliance-report", None, Some(&token))
            .await;
    }

    let response = app
        .request("GET", "/api/patient/compliance-history?limit=1", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let reports = response.data()["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["report_type"], "overall");
    assert_eq!(reports[0]["grade"], "fair");

    let all = app
        .request("GET", "/api/patient/compliance-history", None, Some(&token))
        .await;
    assert_eq!(all.data()["reports"].as_array().unwrap().len(), 2);
}
