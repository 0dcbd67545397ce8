//! Recording transport for exercising delivery without a push service.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use gtms_entity::push::SubscriptionKeys;

use crate::error::PushError;
use crate::payload::PushMessage;
use crate::transport::PushTransport;

/// Scripted outcome for an endpoint.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Fail with this error.
    Fail(PushError),
    /// Sleep before succeeding.
    Hang(Duration),
}

/// A [`PushTransport`] that records every call and answers from a
/// per-endpoint script. Unscripted endpoints succeed.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    script: Mutex<HashMap<String, ScriptedOutcome>>,
    sent: Mutex<Vec<(String, PushMessage)>>,
}

impl RecordingTransport {
    /// A transport where every endpoint succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `endpoint` fail with `error`.
    pub async fn fail(&self, endpoint: &str, error: PushError) {
        self.script
            .lock()
            .await
            .insert(endpoint.to_string(), ScriptedOutcome::Fail(error));
    }

    /// Make `endpoint` stall for `delay` before answering.
    pub async fn hang(&self, endpoint: &str, delay: Duration) {
        self.script
            .lock()
            .await
            .insert(endpoint.to_string(), ScriptedOutcome::Hang(delay));
    }

    /// Every attempted delivery, in call order.
    pub async fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn send(
        &self,
        endpoint: &str,
        _keys: &SubscriptionKeys,
        message: &PushMessage,
    ) -> Result<(), PushError> {
        self.sent
            .lock()
            .await
            .push((endpoint.to_string(), message.clone()));
        let outcome = self.script.lock().await.get(endpoint).cloned();
        match outcome {
            Some(ScriptedOutcome::Fail(err)) => Err(err),
            Some(ScriptedOutcome::Hang(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn public_key(&self) -> Option<&str> {
        Some("BRecordingTransportPublicKey")
    }
}
