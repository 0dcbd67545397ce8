//! Bearer token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gtms_core::config::AuthConfig;
use gtms_core::error::AppError;

/// Claims carried by access tokens issued by the account service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user ID.
    pub sub: Uuid,
    /// Role name.
    pub role: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Validates HS256 access tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AppError::authentication("Invalid or expired token").with_code("INVALID_TOKEN")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(secret: &str, exp: i64) -> String {
        let claims = Claims {
            sub: Uuid::nil(),
            role: "patient".into(),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_round_trip_and_rejections() {
        let config = AuthConfig::default();
        let verifier = TokenVerifier::new(&config);
        let future = chrono::Utc::now().timestamp() + 600;

        let claims = verifier.verify(&token(&config.jwt_secret, future)).unwrap();
        assert_eq!(claims.role, "patient");

        let err = verifier.verify(&token("other-secret", future)).unwrap_err();
        assert_eq!(err.code, Some("INVALID_TOKEN"));

        let past = chrono::Utc::now().timestamp() - 3600;
        assert!(verifier.verify(&token(&config.jwt_secret, past)).is_err());
    }
}
