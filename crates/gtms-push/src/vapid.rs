//! VAPID application-server authorization (RFC 8292).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use p256::SecretKey;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::EncodePrivateKey;
use serde::{Deserialize, Serialize};

use gtms_core::config::PushConfig;

use crate::ece::decode_b64url;
use crate::error::PushError;

/// Lifetime of a signed VAPID token.
const TOKEN_VALIDITY_HOURS: i64 = 12;

#[derive(Debug, Serialize, Deserialize)]
struct VapidClaims {
    aud: String,
    exp: i64,
    sub: String,
}

/// Signs per-origin VAPID tokens with the application server key.
#[derive(Clone)]
pub struct VapidSigner {
    key: EncodingKey,
    public_key: String,
    subject: String,
}

impl std::fmt::Debug for VapidSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidSigner")
            .field("public_key", &self.public_key)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl VapidSigner {
    /// Build a signer from a base64url raw P-256 private scalar.
    pub fn new(private_key: &str, subject: impl Into<String>) -> Result<Self, PushError> {
        let raw = decode_b64url(private_key)
            .map_err(|e| PushError::Configuration(format!("VAPID private key: {e}")))?;
        let secret = SecretKey::from_slice(&raw)
            .map_err(|_| PushError::Configuration("VAPID private key is not a P-256 scalar".into()))?;
        let der = secret
            .to_pkcs8_der()
            .map_err(|e| PushError::Configuration(format!("VAPID key encoding: {e}")))?;
        let public_key =
            URL_SAFE_NO_PAD.encode(secret.public_key().to_encoded_point(false).as_bytes());

        Ok(Self {
            key: EncodingKey::from_ec_der(der.as_bytes()),
            public_key,
            subject: subject.into(),
        })
    }

    /// Build a signer from push configuration.
    pub fn from_config(config: &PushConfig) -> Result<Self, PushError> {
        Self::new(&config.vapid_private_key, config.vapid_subject.clone())
    }

    /// Application server public key, base64url, as clients pass it to
    /// `pushManager.subscribe`.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// `Authorization` header value for a request to `endpoint`.
    pub fn authorization(&self, endpoint: &str, now: DateTime<Utc>) -> Result<String, PushError> {
        let url = reqwest::Url::parse(endpoint)
            .map_err(|e| PushError::Transport(format!("invalid endpoint: {e}")))?;
        let claims = VapidClaims {
            aud: url.origin().ascii_serialization(),
            exp: (now + Duration::hours(TOKEN_VALIDITY_HOURS)).timestamp(),
            sub: self.subject.clone(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::ES256), &claims, &self.key)
            .map_err(|e| PushError::Configuration(format!("VAPID signing failed: {e}")))?;
        Ok(format!("vapid t={token}, k={}", self.public_key))
    }
}
