use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::attendance::AttendanceRecord;
use crate::authority::QrAuthority;
use crate::error::AttendanceError;
use crate::signing::{SignedPayload, SigningRequest, VerificationRequest};

#[derive(Clone)]
pub struct AppState {
    pub authority: Arc<QrAuthority>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignResponse {
    pub payload: SignedPayload,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub attendance: AttendanceRecord,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceListResponse {
    pub activity_id: String,
    pub records: Vec<AttendanceRecord>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(|| async move { (StatusCode::OK, "Ok").into_response() }))
        .route("/sign", post(sign_handler))
        .route("/verify", post(verify_handler))
        .route("/activities/{activity_id}/attendance", get(list_handler))
        .with_state(state)
}

pub async fn run(host: String, port: u16, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("binding {host}:{port}"))?;
    info!(addr = %listener.local_addr()?, "attendance server listening");

    axum::serve(listener, router(state))
        .await
        .context("serving http")?;

    Ok(())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AttendanceError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AttendanceError::InvalidRequest(rejection.body_text()))
}

/// Logs a failed request with the level its kind deserves. The specific kind
/// only ever reaches the log, never the response body.
fn audit(err: &AttendanceError, route: &str, user_id: Option<&str>, activity_id: Option<&str>) {
    let kind = err.kind();
    match err {
        AttendanceError::Configuration(detail) => {
            error!(route, kind, %detail, "signing secret missing; operator action required");
        }
        AttendanceError::Unexpected(detail) => {
            error!(route, kind, detail = %format!("{detail:#}"), "request failed");
        }
        _ if err.is_security_rejection() => {
            warn!(route, kind, user_id, activity_id, "qr payload rejected");
        }
        _ => {
            info!(route, kind, %err, "bad request");
        }
    }
}

async fn sign_handler(
    State(state): State<AppState>,
    payload: Result<Json<SigningRequest>, JsonRejection>,
) -> Result<Json<SignResponse>, AttendanceError> {
    let request = body(payload).inspect_err(|e| audit(e, "/sign", None, None))?;

    match state.authority.sign(&request) {
        Ok(payload) => {
            info!(
                user_id = %payload.user_id,
                activity_id = %payload.activity_id,
                timestamp = %payload.timestamp,
                "issued attendance payload"
            );
            Ok(Json(SignResponse { payload }))
        }
        Err(err) => {
            audit(
                &err,
                "/sign",
                request.user_id.as_deref(),
                request.activity_id.as_deref(),
            );
            Err(err)
        }
    }
}

async fn verify_handler(
    State(state): State<AppState>,
    payload: Result<Json<VerificationRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, AttendanceError> {
    let request = body(payload).inspect_err(|e| audit(e, "/verify", None, None))?;

    match state.authority.verify(&request) {
        Ok(attendance) => {
            info!(
                user_id = %attendance.user_id,
                activity_id = %attendance.activity_id,
                "attendance recorded"
            );
            Ok(Json(VerifyResponse { attendance }))
        }
        Err(err) => {
            audit(
                &err,
                "/verify",
                request.user_id.as_deref(),
                request.activity_id.as_deref(),
            );
            Err(err)
        }
    }
}

async fn list_handler(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> Result<Json<AttendanceListResponse>, AttendanceError> {
    let records = state
        .authority
        .store()
        .list_for_activity(&activity_id)
        .map_err(AttendanceError::from)
        .inspect_err(|e| audit(e, "/activities/attendance", None, Some(activity_id.as_str())))?;

    Ok(Json(AttendanceListResponse {
        activity_id,
        records,
    }))
}
