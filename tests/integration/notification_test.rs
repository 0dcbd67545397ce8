//! Integration tests for the notification inbox.

mod helpers;

use axum::http::StatusCode;
use uuid::Uuid;

use gtms_entity::notification::{NotificationKind, NotificationPriority};
use gtms_service::notification::NotificationRequest;

async fn seed(app: &helpers::TestApp, user_id: Uuid, kind: NotificationKind, title: &str) -> Uuid {
    app.state
        .factory
        .create(NotificationRequest::new(
            user_id,
            kind,
            title,
            "body",
            NotificationPriority::High,
        ))
        .await
        .expect("notification should be created")
        .notification_id
}

#[tokio::test]
async fn test_inbox_requires_bearer_token() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/api/patient/notifications", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), Some("UNAUTHORIZED"));
    assert_eq!(response.body["success"], false);

    let response = app
        .request("GET", "/api/patient/notifications", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), Some("INVALID_TOKEN"));
}

#[tokio::test]
async fn test_inbox_rejects_non_patient_role() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.admin();

    let response = app
        .request("GET", "/api/patient/notifications", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), Some("INSUFFICIENT_PERMISSIONS"));
}

#[tokio::test]
async fn test_list_notifications_with_display_fields() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.patient();
    seed(&app, user_id, NotificationKind::MedicationReminder, "Take drops").await;
    seed(&app, user_id, NotificationKind::AppointmentReminder, "Clinic tomorrow").await;
    let (other, _) = app.patient();
    seed(&app, other, NotificationKind::HealthAlert, "Not yours").await;

    let response = app
        .request("GET", "/api/patient/notifications", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let data = response.data();
    let items = data["notifications"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(data["unread_count"], 2);
    assert_eq!(data["sound_base_url"], "/api/sounds/");
    assert_eq!(data["available_sounds"]["medication"], "medication-reminder.mp3");

    let medication = items
        .iter()
        .find(|n| n["notification_type"] == "medication_reminder")
        .unwrap();
    assert_eq!(medication["sound_file"], "medication-reminder.mp3");
    assert_eq!(medication["is_read"], false);
    assert!(!medication["notification_type_display"].as_str().unwrap().is_empty());
    assert!(!medication["priority_display"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_mark_read_is_idempotent() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.patient();
    let id = seed(&app, user_id, NotificationKind::MedicationReminder, "Take drops").await;
    let path = format!("/api/patient/notifications/{id}/read");

    let first = app.request("PUT", &path, None, Some(&token)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["changed"], true);

    let second = app.request("PUT", &path, None, Some(&token)).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["changed"], false);

    let reads = app
        .store
        .history()
        .await
        .into_iter()
        .filter(|h| h.notification_id == id && h.action_type == "read")
        .count();
    assert_eq!(reads, 1);

    let listed = app
        .request("GET", "/api/patient/notifications?unread_only=true", None, Some(&token))
        .await;
    assert_eq!(listed.data()["notifications"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_mark_read_of_foreign_notification_is_not_found() {
    let app = helpers::TestApp::new().await;
    let (owner, _) = app.patient();
    let id = seed(&app, owner, NotificationKind::MedicationReminder, "Take drops").await;
    let (_, intruder_token) = app.patient();

    let response = app
        .request(
            "PUT",
            &format!("/api/patient/notifications/{id}/read"),
            None,
            Some(&intruder_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.code(), Some("NOTIFICATION_NOT_FOUND"));
}

#[tokio::test]
async fn test_mark_all_read_counts_unread_rows() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.patient();
    for title in ["a", "b", "c"] {
        seed(&app, user_id, NotificationKind::SystemAnnouncement, title).await;
    }

    let response = app
        .request("PUT", "/api/patient/notifications/mark-all-read", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["updated"], 3);

    let again = app
        .request("PUT", "/api/patient/notifications/mark-all-read", None, Some(&token))
        .await;
    assert_eq!(again.data()["updated"], 0);
}

#[tokio::test]
async fn test_history_filters_and_paginates() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.patient();
    for i in 0..3 {
        seed(&app, user_id, NotificationKind::MedicationReminder, &format!("dose {i}")).await;
    }
    seed(&app, user_id, NotificationKind::AppointmentReminder, "clinic").await;

    let response = app
        .request(
            "GET",
            "/api/patient/notification-history?type=medication_reminder&limit=2&page=1",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["notifications"].as_array().unwrap().len(), 2);
    assert_eq!(data["pagination"]["total_items"], 3);
    assert_eq!(data["pagination"]["total_pages"], 2);
    assert_eq!(data["pagination"]["items_per_page"], 2);

    let searched = app
        .request(
            "GET",
            "/api/patient/notification-history?search=CLINIC",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(searched.data()["pagination"]["total_items"], 1);
}

#[tokio::test]
async fn test_history_rejects_malformed_dates() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.patient();

    let response = app
        .request(
            "GET",
            "/api/patient/notification-history?start_date=18-10-2026",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("INVALID_FILTER"));
}

#[tokio::test]
async fn test_analytics_groups_by_type_and_clamps_period() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.patient();
    let read = seed(&app, user_id, NotificationKind::MedicationReminder, "one").await;
    seed(&app, user_id, NotificationKind::MedicationReminder, "two").await;
    app.request(
        "PUT",
        &format!("/api/patient/notifications/{read}/read"),
        None,
        Some(&token),
    )
    .await;

    let response = app
        .request(
            "GET",
            "/api/patient/notification-analytics?period=400",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["period_days"], 30);
    let rows = data["analytics"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["notification_type"], "medication_reminder");
    assert_eq!(rows[0]["total_sent"], 2);
    assert_eq!(rows[0]["total_read"], 1);
    assert_eq!(rows[0]["read_rate"], 50.0);
}

#[tokio::test]
async fn test_missing_notification_table_lists_empty() {
    let app = helpers::TestApp::with_store(
        gtms_database::MemoryRecordStore::new().without_notification_table(),
    )
    .await;
    let (_, token) = app.patient();

    let response = app
        .request("GET", "/api/patient/notifications", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["notifications"].as_array().unwrap().len(), 0);
}
