//! Role guards for patient and operator routes.

use gtms_core::error::AppError;

use crate::extractors::AuthUser;
use crate::state::AppState;

fn forbidden(message: &str) -> AppError {
    AppError::authorization(message).with_code("INSUFFICIENT_PERMISSIONS")
}

/// Checks that the authenticated user holds the patient role.
pub fn require_patient(state: &AppState, auth: &AuthUser) -> Result<(), AppError> {
    if auth.role != state.config.auth.patient_role {
        return Err(forbidden("Patient access required"));
    }
    Ok(())
}

/// Checks that the authenticated user holds the admin role.
pub fn require_admin(state: &AppState, auth: &AuthUser) -> Result<(), AppError> {
    if auth.role != state.config.auth.admin_role {
        return Err(forbidden("Admin access required"));
    }
    Ok(())
}
