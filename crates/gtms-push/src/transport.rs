//! Push service transport.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};

use gtms_core::config::PushConfig;
use gtms_entity::push::SubscriptionKeys;

use crate::ece;
use crate::error::PushError;
use crate::payload::PushMessage;
use crate::vapid::VapidSigner;

/// Delivers one message to one push endpoint.
#[async_trait]
pub trait PushTransport: Send + Sync + std::fmt::Debug {
    /// Send `message` to `endpoint`, encrypted for `keys`.
    async fn send(
        &self,
        endpoint: &str,
        keys: &SubscriptionKeys,
        message: &PushMessage,
    ) -> Result<(), PushError>;

    /// Application server key clients subscribe with, when known.
    fn public_key(&self) -> Option<&str> {
        None
    }
}

/// RFC 8030 transport over HTTPS.
#[derive(Debug, Clone)]
pub struct WebPushTransport {
    client: reqwest::Client,
    signer: VapidSigner,
}

impl WebPushTransport {
    /// Build a transport from push configuration.
    pub fn from_config(config: &PushConfig) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_seconds))
            .build()
            .map_err(|e| PushError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            signer: VapidSigner::from_config(config)?,
        })
    }
}

/// Map a push service response status to a delivery outcome.
pub fn classify_status(status: StatusCode) -> Result<(), PushError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::GONE {
        Err(PushError::Gone)
    } else {
        Err(PushError::Rejected {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(
        &self,
        endpoint: &str,
        keys: &SubscriptionKeys,
        message: &PushMessage,
    ) -> Result<(), PushError> {
        let body = ece::encrypt(&message.payload, &keys.p256dh, &keys.auth)?;
        let authorization = self.signer.authorization(endpoint, Utc::now())?;

        let mut request = self
            .client
            .post(endpoint)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_ENCODING, "aes128gcm")
            .header(CONTENT_TYPE, "application/octet-stream")
            .header("TTL", message.ttl_seconds.to_string())
            .header("Urgency", message.urgency);
        if let Some(topic) = &message.topic {
            request = request.header("Topic", topic);
        }

        let response = request.body(body).send().await.map_err(|e| {
            if e.is_timeout() {
                PushError::Timeout
            } else {
                PushError::Transport(e.to_string())
            }
        })?;

        classify_status(response.status())
    }

    fn public_key(&self) -> Option<&str> {
        Some(self.signer.public_key())
    }
}
