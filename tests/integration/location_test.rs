//! Integration tests for location reports and geofence reminders.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

fn hospital_reminder() -> Value {
    json!({
        "location_name": "Siriraj Hospital",
        "latitude": 13.7590,
        "longitude": 100.4850,
        "radius": 200.0,
        "reminder_type": "appointment",
        "reminder_message": "Bring your eye drops to the clinic",
        "trigger_type": "enter"
    })
}

async fn create_reminder(app: &helpers::TestApp, token: &str, body: Value) -> helpers::TestResponse {
    app.request("POST", "/api/patient/location-reminders", Some(body), Some(token))
        .await
}

#[tokio::test]
async fn test_create_and_list_reminders() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.patient();

    let created = create_reminder(&app, &token, hospital_reminder()).await;
    assert_eq!(created.status, StatusCode::OK);
    let reminder_id = created.data()["reminder_id"].clone();

    let listed = app
        .request("GET", "/api/patient/location-reminders", None, Some(&token))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    let reminders = listed.data()["reminders"].as_array().unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0]["id"], reminder_id);
    assert_eq!(reminders[0]["trigger_type"], "enter");
    assert_eq!(reminders[0]["radius_meters"], 200.0);
    assert!(!reminders[0]["reminder_type_display"].as_str().unwrap().is_empty());

    let (_, other_token) = app.patient();
    let other = app
        .request("GET", "/api/patient/location-reminders", None, Some(&other_token))
        .await;
    assert_eq!(other.data()["reminders"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_reminder_defaults_radius_and_trigger() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.patient();
    let mut body = hospital_reminder();
    body.as_object_mut().unwrap().remove("radius");
    body.as_object_mut().unwrap().remove("trigger_type");

    let created = create_reminder(&app, &token, body).await;
    assert_eq!(created.status, StatusCode::OK);

    let stored = app.store.location_reminders().await;
    assert_eq!(stored[0].radius_meters, 100.0);
    assert_eq!(stored[0].trigger_type, "enter");
}

#[tokio::test]
async fn test_create_reminder_validation_codes() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.patient();

    let response = create_reminder(
        &app,
        &token,
        json!({ "location_name": "Home", "latitude": 13.7, "longitude": 100.5 }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("MISSING_DATA"));

    let mut out_of_range = hospital_reminder();
    out_of_range["latitude"] = json!(120.0);
    let response = create_reminder(&app, &token, out_of_range).await;
    assert_eq!(response.code(), Some("INVALID_LOCATION"));

    let mut bad_trigger = hospital_reminder();
    bad_trigger["trigger_type"] = json!("dwell");
    let response = create_reminder(&app, &token, bad_trigger).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("INVALID_TRIGGER_TYPE"));
}

#[tokio::test]
async fn test_report_inside_radius_fires_reminder() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.patient();
    create_reminder(&app, &token, hospital_reminder()).await;

    let response = app
        .request(
            "POST",
            "/api/patient/location",
            Some(json!({ "latitude": 13.7592, "longitude": 100.4851, "accuracy": 12.0 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["location_recorded"], true);
    let fired = data["triggered_reminders"].as_array().unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0]["location_name"], "Siriraj Hospital");
    assert!(fired[0]["distance_meters"].as_f64().unwrap() < 200.0);
    assert!(fired[0]["notification_id"].is_string());

    let notifications = app.store.notifications().await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].user_id, user_id);
    assert_eq!(notifications[0].notification_type, "location_reminder");
    assert_eq!(notifications[0].title, "📍 Siriraj Hospital");
    assert_eq!(notifications[0].body, "Bring your eye drops to the clinic");

    assert_eq!(app.store.recorded_locations().await.len(), 1);
}

#[tokio::test]
async fn test_report_outside_radius_fires_nothing() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.patient();
    create_reminder(&app, &token, hospital_reminder()).await;

    let response = app
        .request(
            "POST",
            "/api/patient/location",
            Some(json!({ "latitude": 13.80, "longitude": 100.50 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["triggered_reminders"].as_array().unwrap().len(), 0);
    assert!(app.store.notifications().await.is_empty());
}

#[tokio::test]
async fn test_report_requires_valid_coordinates() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.patient();

    for body in [
        json!({ "latitude": 13.75 }),
        json!({ "latitude": 91.0, "longitude": 100.0 }),
        json!({ "latitude": 13.75, "longitude": 181.0 }),
    ] {
        let response = app
            .request("POST", "/api/patient/location", Some(body), Some(&token))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.code(), Some("INVALID_LOCATION"));
    }
    assert!(app.store.recorded_locations().await.is_empty());
}

#[tokio::test]
async fn test_location_features_unavailable_without_tables() {
    let app = helpers::TestApp::with_store(
        gtms_database::MemoryRecordStore::new().without_location_tables(),
    )
    .await;
    let (_, token) = app.patient();

    let response = app
        .request(
            "POST",
            "/api/patient/location",
            Some(json!({ "latitude": 13.75, "longitude": 100.5 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.code(), Some("FEATURE_NOT_AVAILABLE"));
}
