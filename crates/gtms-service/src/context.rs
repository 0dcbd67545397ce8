//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role name carried by patient tokens.
pub const PATIENT_ROLE: &str = "patient";
/// Role name carried by operator tokens.
pub const ADMIN_ROLE: &str = "admin";

/// Context for the current authenticated request.
///
/// Built by the API extractors and passed into service methods so every
/// operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// Role claim from the token.
    pub role: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
            request_time: Utc::now(),
        }
    }

    /// Whether the caller holds the patient role.
    pub fn is_patient(&self) -> bool {
        self.role == PATIENT_ROLE
    }

    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}
