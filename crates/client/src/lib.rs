//! HTTP client for the attendance server.
//!
//! Used by the organiser's device to request a code for display and by the
//! scanning device to redeem it.

use qr_attendance::server::{AttendanceListResponse, SignResponse, VerifyResponse};
use qr_attendance::{AttendanceRecord, SignedPayload, SigningRequest, VerificationRequest};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to attendance server failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("attendance server answered {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("invalid QR content: {0}")]
    InvalidContent(String),
    #[error("invalid attendance server url {0:?}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct AttendanceClient {
    base_url: String,
    http: reqwest::Client,
}

impl AttendanceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn sign(&self, user_id: &str, activity_id: &str) -> Result<SignedPayload, ClientError> {
        let response: SignResponse = self
            .post("sign", &SigningRequest::new(user_id, activity_id))
            .await?;
        Ok(response.payload)
    }

    /// Redeems the text read from a QR code.
    pub async fn verify_content(&self, content: &str) -> Result<AttendanceRecord, ClientError> {
        let payload = SignedPayload::from_qr_content(content)
            .map_err(|e| ClientError::InvalidContent(format!("{e:#}")))?;
        self.verify(payload).await
    }

    pub async fn verify(&self, payload: SignedPayload) -> Result<AttendanceRecord, ClientError> {
        let response: VerifyResponse = self
            .post("verify", &VerificationRequest::from(payload))
            .await?;
        Ok(response.attendance)
    }

    pub async fn list(&self, activity_id: &str) -> Result<Vec<AttendanceRecord>, ClientError> {
        let url = self.url(&["activities", activity_id, "attendance"])?;
        let response = self.http.get(url).send().await?;
        let listed: AttendanceListResponse = decode(response).await?;
        Ok(listed.records)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, segment: &str, body: &B) -> Result<T, ClientError> {
        let url = self.url(&[segment])?;
        let response = self.http.post(url).json(body).send().await?;
        decode(response).await
    }

    /// Appends each segment percent-encoded, so opaque ids cannot alter the route.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let invalid = || ClientError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(ClientError::Rejected { status, message })
}
