//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use gtms_api::AppState;
use gtms_core::config::AppConfig;
use gtms_database::{MemoryRecordStore, Stores};
use gtms_push::{PushTransport, RecordingTransport};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing record store, for seeding and inspection
    pub store: Arc<MemoryRecordStore>,
    /// Push transport that records deliveries
    pub transport: Arc<RecordingTransport>,
    /// Wired application state
    pub state: AppState,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application over an empty in-memory store
    pub async fn new() -> Self {
        Self::with_store(MemoryRecordStore::new()).await
    }

    /// Create a test application over a prepared store
    pub async fn with_store(store: MemoryRecordStore) -> Self {
        Self::build(AppConfig::default(), store, true).await
    }

    /// Create a test application with push delivery left unconfigured
    pub async fn without_push() -> Self {
        Self::build(AppConfig::default(), MemoryRecordStore::new(), false).await
    }

    /// Create a test application with a custom config
    pub async fn with_config(config: AppConfig) -> Self {
        Self::build(config, MemoryRecordStore::new(), true).await
    }

    async fn build(config: AppConfig, store: MemoryRecordStore, push: bool) -> Self {
        let store = Arc::new(store);
        let transport = Arc::new(RecordingTransport::new());
        let push_transport: Option<Arc<dyn PushTransport>> = if push {
            Some(transport.clone() as Arc<dyn PushTransport>)
        } else {
            None
        };

        let state = AppState::new(
            config.clone(),
            Stores::memory(Arc::clone(&store)),
            None,
            push_transport,
        );
        let router = gtms_api::build_app(state.clone());

        Self {
            router,
            store,
            transport,
            state,
            config,
        }
    }

    /// Mint a bearer token for `user_id` with `role`
    pub fn token(&self, user_id: Uuid, role: &str) -> String {
        let claims = serde_json::json!({
            "sub": user_id,
            "role": role,
            "exp": (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        });
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.auth.jwt_secret.as_bytes()),
        )
        .expect("Failed to sign test token")
    }

    /// A fresh patient and their token
    pub fn patient(&self) -> (Uuid, String) {
        let id = Uuid::new_v4();
        (id, self.token(id, &self.config.auth.patient_role))
    }

    /// A fresh operator and their token
    pub fn admin(&self) -> (Uuid, String) {
        let id = Uuid::new_v4();
        (id, self.token(id, &self.config.auth.admin_role))
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.raw_request(method, path, body_str, token).await
    }

    /// Make an HTTP request with a raw body
    pub async fn raw_request(
        &self,
        method: &str,
        path: &str,
        body: String,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req.body(Body::from(body)).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes: body_bytes.to_vec(),
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: axum::http::HeaderMap,
    /// Raw body
    pub bytes: Vec<u8>,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The machine-readable error code
    pub fn code(&self) -> Option<&str> {
        self.body["code"].as_str()
    }
}
