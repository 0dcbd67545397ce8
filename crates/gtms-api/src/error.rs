//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use gtms_core::error::{AppError, ErrorKind};

/// Code returned when an optional feature's storage is not provisioned.
pub const FEATURE_NOT_AVAILABLE: &str = "FEATURE_NOT_AVAILABLE";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
}

/// An [`AppError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status and default code for the wrapped error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        let err = &self.0;
        match err.kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ErrorKind::Authorization => (StatusCode::FORBIDDEN, "INSUFFICIENT_PERMISSIONS"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::SchemaMissing => (StatusCode::NOT_IMPLEMENTED, FEATURE_NOT_AVAILABLE),
            ErrorKind::ServiceUnavailable if err.code == Some(FEATURE_NOT_AVAILABLE) => {
                (StatusCode::NOT_IMPLEMENTED, FEATURE_NOT_AVAILABLE)
            }
            ErrorKind::ServiceUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ErrorKind::ExternalService => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, default_code) = self.status();
        let code = self.0.code.unwrap_or(default_code);

        let message = if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            tracing::error!(error = %self.0, code, "Request failed");
            "Internal server error".to_string()
        } else {
            self.0.message
        };

        let body = ApiErrorResponse {
            success: false,
            message,
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_not_available_is_501() {
        let err = ApiError(
            AppError::service_unavailable("Push notifications are not available")
                .with_code(FEATURE_NOT_AVAILABLE),
        );
        assert_eq!(err.status().0, StatusCode::NOT_IMPLEMENTED);

        let err = ApiError(AppError::schema_missing("relation does not exist"));
        assert_eq!(err.into_response().status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_explicit_code_wins() {
        let err = ApiError(AppError::validation("INVALID_LOCATION", "bad latitude"));
        let (status, default_code) = err.status();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(default_code, "VALIDATION_ERROR");
        assert_eq!(err.0.code, Some("INVALID_LOCATION"));
    }

    #[test]
    fn test_database_errors_hide_details() {
        let err = ApiError(AppError::database("connection refused at 10.0.0.3"));
        assert_eq!(err.status(), (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"));
    }
}
