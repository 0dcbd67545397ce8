//! Registration and removal of browser push subscriptions.

use std::sync::Arc;

use uuid::Uuid;

use gtms_core::error::AppError;
use gtms_database::store::PushSubscriptionStore;
use gtms_entity::push::SubscriptionKeys;
use gtms_push::DeliveryDispatcher;

use crate::context::RequestContext;

/// A subscription as posted by the browser.
#[derive(Debug, Clone, Default)]
pub struct SubscribeInput {
    pub endpoint: Option<String>,
    pub p256dh: Option<String>,
    pub auth: Option<String>,
    pub device_info: Option<serde_json::Value>,
}

fn unavailable(err: AppError) -> AppError {
    if err.is_schema_missing() {
        AppError::service_unavailable("Push notifications are not available")
            .with_code("FEATURE_NOT_AVAILABLE")
    } else {
        err
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::validation("INVALID_SUBSCRIPTION", format!("Missing subscription {field}"))
        })
}

/// Stores push subscriptions for the caller.
#[derive(Debug, Clone)]
pub struct SubscriptionService {
    subscriptions: Arc<dyn PushSubscriptionStore>,
    dispatcher: Arc<DeliveryDispatcher>,
}

impl SubscriptionService {
    /// Creates a new subscription service.
    pub fn new(
        subscriptions: Arc<dyn PushSubscriptionStore>,
        dispatcher: Arc<DeliveryDispatcher>,
    ) -> Self {
        Self {
            subscriptions,
            dispatcher,
        }
    }

    /// The application server key browsers subscribe with.
    pub fn public_key(&self) -> Option<&str> {
        self.dispatcher.public_key()
    }

    /// Upsert a subscription on (user, endpoint) and reactivate it.
    pub async fn subscribe(
        &self,
        ctx: &RequestContext,
        input: SubscribeInput,
    ) -> Result<Uuid, AppError> {
        let endpoint = required(input.endpoint, "endpoint")?;
        if !endpoint.starts_with("https://") {
            return Err(AppError::validation(
                "INVALID_SUBSCRIPTION",
                "Subscription endpoint must be an https URL",
            ));
        }
        let keys = SubscriptionKeys {
            p256dh: required(input.p256dh, "p256dh key")?,
            auth: required(input.auth, "auth key")?,
        };

        let id = self
            .subscriptions
            .upsert(ctx.user_id, &endpoint, &keys, input.device_info)
            .await
            .map_err(unavailable)?;
        tracing::info!(user_id = %ctx.user_id, subscription_id = %id, "Push subscription saved");
        Ok(id)
    }

    /// Deactivate the caller's subscription for `endpoint`.
    pub async fn unsubscribe(
        &self,
        ctx: &RequestContext,
        endpoint: Option<String>,
    ) -> Result<bool, AppError> {
        let endpoint = required(endpoint, "endpoint")?;
        let removed = self
            .subscriptions
            .deactivate_by_endpoint(ctx.user_id, &endpoint)
            .await
            .map_err(unavailable)?;
        if removed {
            tracing::info!(user_id = %ctx.user_id, "Push subscription deactivated");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtms_core::config::PushConfig;
    use gtms_core::error::ErrorKind;
    use gtms_database::MemoryRecordStore;

    fn service(store: &Arc<MemoryRecordStore>) -> SubscriptionService {
        let dispatcher = DeliveryDispatcher::new(
            store.clone(),
            store.clone(),
            store.clone(),
            None,
            Arc::new(PushConfig::default()),
        );
        SubscriptionService::new(store.clone(), Arc::new(dispatcher))
    }

    fn input(endpoint: &str) -> SubscribeInput {
        SubscribeInput {
            endpoint: Some(endpoint.to_string()),
            p256dh: Some("BPk".to_string()),
            auth: Some("c2VjcmV0".to_string()),
            device_info: Some(serde_json::json!({"ua": "firefox"})),
        }
    }

    #[tokio::test]
    async fn test_resubscribe_reuses_row() {
        let store = Arc::new(MemoryRecordStore::new());
        let svc = service(&store);
        let ctx = RequestContext::new(Uuid::new_v4(), "patient");

        let first = svc.subscribe(&ctx, input("https://push.example/a")).await.unwrap();
        assert!(svc.unsubscribe(&ctx, Some("https://push.example/a".into())).await.unwrap());
        let second = svc.subscribe(&ctx, input("https://push.example/a")).await.unwrap();

        assert_eq!(first, second);
        let subs = store.subscriptions().await;
        assert_eq!(subs.len(), 1);
        assert!(subs[0].is_active);
    }

    #[tokio::test]
    async fn test_missing_keys_rejected() {
        let store = Arc::new(MemoryRecordStore::new());
        let svc = service(&store);
        let ctx = RequestContext::new(Uuid::new_v4(), "patient");

        let mut bad = input("https://push.example/a");
        bad.auth = None;
        let err = svc.subscribe(&ctx, bad).await.unwrap_err();
        assert_eq!(err.code, Some("INVALID_SUBSCRIPTION"));

        let err = svc
            .subscribe(&ctx, input("http://push.example/a"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_unprovisioned_table_is_feature_not_available() {
        let store = Arc::new(MemoryRecordStore::new().without_push_tables());
        let svc = service(&store);
        let ctx = RequestContext::new(Uuid::new_v4(), "patient");
        let err = svc
            .subscribe(&ctx, input("https://push.example/a"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
        assert_eq!(err.code, Some("FEATURE_NOT_AVAILABLE"));
    }
}
