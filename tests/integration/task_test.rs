//! Integration tests for operator-triggered scheduled checks.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, NaiveTime, Utc};
use uuid::Uuid;

use gtms_database::MemoryRecordStore;
use gtms_entity::clinical::IopMeasurement;

#[tokio::test]
async fn test_task_routes_require_admin() {
    let app = helpers::TestApp::new().await;
    let (_, patient_token) = app.patient();

    let response = app
        .request("GET", "/api/admin/tasks", None, Some(&patient_token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), Some("INSUFFICIENT_PERMISSIONS"));

    let response = app
        .request("POST", "/api/admin/tasks/high_iop/run", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_tasks_shows_schedule() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.admin();

    let response = app.request("GET", "/api/admin/tasks", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let tasks = response.data()["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 4);
    let high_iop = tasks.iter().find(|t| t["name"] == "high_iop").unwrap();
    assert_eq!(high_iop["cron"], "0 0 8,12,18 * * *");
    assert!(high_iop["last_run"].is_null());
}

#[tokio::test]
async fn test_run_high_iop_check_creates_alert_and_notification() {
    let store = MemoryRecordStore::new();
    let patient_id = Uuid::new_v4();
    let today = (Utc::now() + Duration::minutes(420)).date_naive();
    store
        .add_iop_measurement(IopMeasurement {
            id: Uuid::new_v4(),
            patient_id,
            measurement_date: today,
            measurement_time: NaiveTime::from_hms_opt(7, 30, 0),
            left_eye_iop: Some(24.0),
            right_eye_iop: Some(18.0),
        })
        .await;
    let app = helpers::TestApp::with_store(store).await;
    let (_, token) = app.admin();

    let response = app
        .request("POST", "/api/admin/tasks/high_iop/run", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["task"], "high_iop");
    assert_eq!(data["status"], "succeeded");
    assert_eq!(data["scanned"], 1);
    assert_eq!(data["created"], 1);
    assert_eq!(data["failures"], 0);

    let alerts = app.store.alerts().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].patient_id, patient_id);
    assert_eq!(alerts[0].alert_type, "high_iop");

    let notifications = app.store.notifications().await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].notification_type, "health_alert");
    assert_eq!(notifications[0].action_url.as_deref(), Some("/iop-measurements"));

    let listed = app.request("GET", "/api/admin/tasks", None, Some(&token)).await;
    let high_iop = listed.data()["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "high_iop")
        .cloned()
        .unwrap();
    assert_eq!(high_iop["last_run"]["created"], 1);
}

#[tokio::test]
async fn test_run_unknown_task_is_not_found() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.admin();

    let response = app
        .request("POST", "/api/admin/tasks/cleanup/run", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.code(), Some("TASK_NOT_FOUND"));
}
