//! Integration tests for health endpoints and sound assets.

mod helpers;

use axum::http::{StatusCode, header};

use gtms_core::config::AppConfig;

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["status"], "ok");
    assert!(response.data()["version"].is_string());
}

#[tokio::test]
async fn test_detailed_health_reports_components() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"], "in_memory");
    assert_eq!(data["push"], "configured");

    let mut names: Vec<&str> = data["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    assert_eq!(
        names,
        ["appointment_reminder", "high_iop", "low_inventory", "missed_medication"]
    );

    let unconfigured = helpers::TestApp::without_push().await;
    let response = unconfigured
        .request("GET", "/api/health/detailed", None, None)
        .await;
    assert_eq!(response.data()["push"], "disabled");
}

#[tokio::test]
async fn test_unknown_sound_is_not_found() {
    let app = helpers::TestApp::new().await;

    for path in ["/api/sounds/ringtone.mp3", "/api/sounds/..%2F..%2FCargo.toml"] {
        let response = app.request("GET", path, None, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(response.code(), Some("SOUND_NOT_FOUND"));
    }
}

#[tokio::test]
async fn test_missing_sound_file_is_not_found() {
    let mut config = AppConfig::default();
    config.sounds.directory = std::env::temp_dir()
        .join(format!("gtms-no-sounds-{}", uuid::Uuid::new_v4()))
        .display()
        .to_string();
    let app = helpers::TestApp::with_config(config).await;

    let response = app
        .request("GET", "/api/sounds/iop-warning.mp3", None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.code(), Some("SOUND_NOT_FOUND"));
}

#[tokio::test]
async fn test_sound_is_served_with_cache_headers() {
    let dir = std::env::temp_dir().join(format!("gtms-sounds-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("medication-reminder.mp3"), b"ID3fake-audio").unwrap();

    let mut config = AppConfig::default();
    config.sounds.directory = dir.display().to_string();
    let app = helpers::TestApp::with_config(config).await;

    let response = app
        .request("GET", "/api/sounds/medication-reminder.mp3", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        response.headers[header::CACHE_CONTROL],
        "public, max-age=86400"
    );
    assert_eq!(response.bytes, b"ID3fake-audio");

    let _ = std::fs::remove_dir_all(&dir);
}
