use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;

/// Body of `POST /sign`.
///
/// Fields are optional at the serde layer so a missing field surfaces as
/// [`AttendanceError::InvalidRequest`] rather than a deserializer rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SigningRequest {
    pub user_id: Option<String>,
    pub activity_id: Option<String>,
}

impl SigningRequest {
    pub fn new(user_id: impl Into<String>, activity_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            activity_id: Some(activity_id.into()),
        }
    }
}

/// A signed attendance token, handed to the client and rendered as a QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayload {
    pub user_id: String,
    pub activity_id: String,
    pub timestamp: String,
    pub signature: String,
}

impl SignedPayload {
    /// Text encoded into the QR code.
    pub fn to_qr_content(&self) -> Result<String> {
        serde_json::to_string(self).context("serializing payload for QR content")
    }

    pub fn from_qr_content(content: &str) -> Result<Self> {
        serde_json::from_str(content.trim()).context("parsing QR content")
    }
}

/// Body of `POST /verify`, as read back from a scanned code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationRequest {
    pub user_id: Option<String>,
    pub activity_id: Option<String>,
    pub timestamp: Option<String>,
    pub signature: Option<String>,
}

impl From<SignedPayload> for VerificationRequest {
    fn from(payload: SignedPayload) -> Self {
        Self {
            user_id: Some(payload.user_id),
            activity_id: Some(payload.activity_id),
            timestamp: Some(payload.timestamp),
            signature: Some(payload.signature),
        }
    }
}

/// Returns the trimmed-non-empty value of a required field.
pub(crate) fn required<'a>(
    value: &'a Option<String>,
    field: &str,
) -> Result<&'a str, AttendanceError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AttendanceError::InvalidRequest(format!("{field} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_request_tolerates_missing_fields() {
        let request: SigningRequest = serde_json::from_str(r#"{"userId":"u1"}"#).unwrap();
        assert_eq!(request.user_id.as_deref(), Some("u1"));
        assert!(request.activity_id.is_none());
    }

    #[test]
    fn payload_uses_camel_case_fields() {
        let payload = SignedPayload {
            user_id: "u1".into(),
            activity_id: "a1".into(),
            timestamp: "2024-05-01T12:00:00.000Z".into(),
            signature: "ab".into(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["activityId"], "a1");
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00.000Z");
        assert_eq!(value["signature"], "ab");
    }

    #[test]
    fn qr_content_parses_back_with_surrounding_whitespace() {
        let payload = SignedPayload {
            user_id: "u1".into(),
            activity_id: "a1".into(),
            timestamp: "2024-05-01T12:00:00.000Z".into(),
            signature: "ab".into(),
        };
        let content = format!("\n{}  ", payload.to_qr_content().unwrap());
        assert_eq!(SignedPayload::from_qr_content(&content).unwrap(), payload);
    }

    #[test]
    fn required_rejects_blank_and_missing() {
        assert!(required(&None, "userId").is_err());
        assert!(required(&Some("   ".into()), "userId").is_err());
        assert_eq!(required(&Some("u1".into()), "userId").unwrap(), "u1");

        let err = required(&None, "activityId").unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: activityId is required");
    }
}
