//! Integration tests for push subscriptions and delivery.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

use gtms_entity::notification::{NotificationKind, NotificationPriority};
use gtms_push::PushError;
use gtms_service::notification::NotificationRequest;

const ENDPOINT: &str = "https://push.example.com/send/abc123";

fn subscription(endpoint: &str) -> Value {
    json!({
        "subscription": {
            "endpoint": endpoint,
            "keys": { "p256dh": "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM", "auth": "tBHItJI5svbpez7KI4CCXg" }
        },
        "device_info": { "platform": "android" }
    })
}

#[tokio::test]
async fn test_vapid_public_key() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request("GET", "/api/push/vapid-public-key", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["public_key"], "BRecordingTransportPublicKey");

    let unconfigured = helpers::TestApp::without_push().await;
    let response = unconfigured
        .request("GET", "/api/push/vapid-public-key", None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.code(), Some("FEATURE_NOT_AVAILABLE"));
}

#[tokio::test]
async fn test_subscribe_upserts_by_endpoint() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.patient();

    let first = app
        .request("POST", "/api/patient/push-subscribe", Some(subscription(ENDPOINT)), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let id = first.data()["subscription_id"].clone();

    let second = app
        .request("POST", "/api/patient/push-subscribe", Some(subscription(ENDPOINT)), Some(&token))
        .await;
    assert_eq!(second.data()["subscription_id"], id);

    let subs = app.store.subscriptions().await;
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].user_id, user_id);
    assert!(subs[0].is_active);
    assert_eq!(subs[0].device_info, Some(json!({ "platform": "android" })));
}

#[tokio::test]
async fn test_subscribe_validates_subscription() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.patient();

    let missing_keys = json!({ "subscription": { "endpoint": ENDPOINT } });
    let response = app
        .request("POST", "/api/patient/push-subscribe", Some(missing_keys), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("INVALID_SUBSCRIPTION"));

    let plain_http = subscription("http://push.example.com/send/abc123");
    let response = app
        .request("POST", "/api/patient/push-subscribe", Some(plain_http), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("INVALID_SUBSCRIPTION"));

    let response = app
        .request("POST", "/api/patient/push-subscribe", Some(json!({})), Some(&token))
        .await;
    assert_eq!(response.code(), Some("INVALID_SUBSCRIPTION"));

    let response = app
        .raw_request(
            "POST",
            "/api/patient/push-subscribe",
            "{not json".to_string(),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), Some("INVALID_REQUEST"));
}

#[tokio::test]
async fn test_subscribe_without_push_tables_is_not_available() {
    let app = helpers::TestApp::with_store(
        gtms_database::MemoryRecordStore::new().without_push_tables(),
    )
    .await;
    let (_, token) = app.patient();

    let response = app
        .request("POST", "/api/patient/push-subscribe", Some(subscription(ENDPOINT)), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.code(), Some("FEATURE_NOT_AVAILABLE"));
}

#[tokio::test]
async fn test_unsubscribe_deactivates_once() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.patient();
    app.request("POST", "/api/patient/push-subscribe", Some(subscription(ENDPOINT)), Some(&token))
        .await;

    let body = json!({ "endpoint": ENDPOINT });
    let first = app
        .request("DELETE", "/api/patient/push-subscribe", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["removed"], true);

    let second = app
        .request("DELETE", "/api/patient/push-subscribe", Some(body), Some(&token))
        .await;
    assert_eq!(second.data()["removed"], false);
    assert!(!app.store.subscriptions().await[0].is_active);
}

#[tokio::test]
async fn test_new_notification_is_pushed_to_subscriptions() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.patient();
    app.request("POST", "/api/patient/push-subscribe", Some(subscription(ENDPOINT)), Some(&token))
        .await;

    let created = app
        .state
        .factory
        .create(
            NotificationRequest::new(
                user_id,
                NotificationKind::MedicationReminder,
                "💊 Time for Timolol",
                "One drop, both eyes",
                NotificationPriority::High,
            )
            .action_url("/medication-tracker"),
        )
        .await
        .unwrap();

    let sent = app.transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, ENDPOINT);
    let payload: Value = serde_json::from_slice(&sent[0].1.payload).unwrap();
    assert_eq!(payload["title"], "💊 Time for Timolol");
    assert_eq!(payload["data"]["url"], "/medication-tracker");
    assert_eq!(
        payload["data"]["notification_id"],
        created.notification_id.to_string()
    );

    let stored = app
        .store
        .notifications()
        .await
        .into_iter()
        .find(|n| n.id == created.notification_id)
        .unwrap();
    assert!(stored.push_sent);
    assert!(stored.sent_at.is_some());
}

#[tokio::test]
async fn test_gone_subscription_is_deactivated() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.patient();
    app.request("POST", "/api/patient/push-subscribe", Some(subscription(ENDPOINT)), Some(&token))
        .await;
    app.transport.fail(ENDPOINT, PushError::Gone).await;

    let created = app
        .state
        .factory
        .create(NotificationRequest::new(
            user_id,
            NotificationKind::SystemAnnouncement,
            "Maintenance",
            "Tonight",
            NotificationPriority::Low,
        ))
        .await
        .unwrap();

    assert!(!app.store.subscriptions().await[0].is_active);
    let stored = app
        .store
        .notifications()
        .await
        .into_iter()
        .find(|n| n.id == created.notification_id)
        .unwrap();
    assert!(!stored.push_sent);
    assert!(app
        .store
        .history()
        .await
        .iter()
        .any(|h| h.notification_id == created.notification_id && h.action_type == "send_failed"));
}
