use axum::{Json, http::StatusCode};
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};
use serde_json::json;

/// Message shown to end users for every security rejection, so a scanner
/// cannot tell which check failed.
pub const REJECTED_CODE_MESSAGE: &str = "invalid or expired code";

/// Message shown for configuration and unexpected failures.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something wrong happened.";

#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Signing is not configured: {0}")]
    Configuration(String),
    #[error("Signature does not match payload")]
    SignatureMismatch,
    #[error("Payload outside validity window (age {age_secs}s)")]
    Expired { age_secs: i64 },
    #[error("Payload has already been used")]
    AlreadyUsed,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl AttendanceError {
    /// Stable identifier kept in server-side audit logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AttendanceError::InvalidRequest(_) => "invalid_request",
            AttendanceError::Configuration(_) => "configuration_error",
            AttendanceError::SignatureMismatch => "signature_mismatch",
            AttendanceError::Expired { .. } => "expired",
            AttendanceError::AlreadyUsed => "already_used",
            AttendanceError::Unexpected(_) => "internal_error",
        }
    }

    pub fn is_security_rejection(&self) -> bool {
        matches!(
            self,
            AttendanceError::SignatureMismatch
                | AttendanceError::Expired { .. }
                | AttendanceError::AlreadyUsed
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AttendanceError::SignatureMismatch | AttendanceError::Expired { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AttendanceError::AlreadyUsed => StatusCode::CONFLICT,
            AttendanceError::Configuration(_) | AttendanceError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Trait implementation to convert this error into an axum http response
impl AxumCoreIntoResponse for AttendanceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if matches!(self, AttendanceError::InvalidRequest(_)) {
            self.to_string()
        } else if self.is_security_rejection() {
            REJECTED_CODE_MESSAGE.to_string()
        } else {
            GENERIC_FAILURE_MESSAGE.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_returns_400() {
        let error = AttendanceError::InvalidRequest("userId is required".into());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn signature_mismatch_returns_401() {
        let response = AttendanceError::SignatureMismatch.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn expired_returns_401() {
        let response = AttendanceError::Expired { age_secs: 301 }.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn already_used_returns_409() {
        let response = AttendanceError::AlreadyUsed.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn configuration_error_returns_500() {
        let error = AttendanceError::Configuration("no secret".into());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unexpected_error_returns_500() {
        let error = AttendanceError::from(anyhow::anyhow!("store offline"));
        assert_eq!(error.kind(), "internal_error");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn only_security_kinds_are_security_rejections() {
        assert!(AttendanceError::SignatureMismatch.is_security_rejection());
        assert!(AttendanceError::Expired { age_secs: 0 }.is_security_rejection());
        assert!(AttendanceError::AlreadyUsed.is_security_rejection());
        assert!(!AttendanceError::InvalidRequest("x".into()).is_security_rejection());
        assert!(!AttendanceError::Configuration("x".into()).is_security_rejection());
    }
}
