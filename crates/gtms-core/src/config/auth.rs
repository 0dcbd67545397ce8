//! Bearer token verification configuration.

use serde::{Deserialize, Serialize};

/// Settings for verifying the HS256 access tokens issued by the
/// account service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Allowed clock skew in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Role claim required on patient routes.
    #[serde(default = "default_patient_role")]
    pub patient_role: String,
    /// Role claim required on operator routes.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            leeway_seconds: default_leeway(),
            patient_role: default_patient_role(),
            admin_role: default_admin_role(),
        }
    }
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_leeway() -> u64 {
    5
}

fn default_patient_role() -> String {
    "patient".to_string()
}

fn default_admin_role() -> String {
    "admin".to_string()
}
