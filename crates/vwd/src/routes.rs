//! HTTP surface: envelope admission, download, and health probes
//!
//! Endpoints:
//!   POST /upload    — verify an envelope, persist it on acceptance
//!   GET  /download  — return ciphertext + authentication metadata by name
//!   GET  /healthz   — liveness (200 if the process is running)
//!   GET  /readyz    — readiness (200 if the durable backend is reachable)
//!
//! The admission decision is fail-closed: an envelope reaches storage only
//! after its signature verifies over the reconstructed canonical payload.
//! Rejections map to 400 (malformed input) or 401 (signature); storage
//! faults map to 500 with details kept out of the response body.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use vw_core::{DownloadResponse, Envelope, VwError};
use vw_storage::FileStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/download", get(download))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
}

/// Response-side error: folds [`VwError`] kinds into HTTP categories.
struct ApiError(VwError);

impl From<VwError> for ApiError {
    fn from(err: VwError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            VwError::Input(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            VwError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            VwError::NotFound(name) => {
                (StatusCode::NOT_FOUND, format!("file not found: {name}")).into_response()
            }
            // Server-side faults: log the detail, return a generic body.
            err => {
                tracing::error!("request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

async fn upload(
    State(state): State<AppState>,
    Json(envelope): Json<Envelope>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if envelope.file_name.is_empty() {
        return Err(VwError::Input("file name is required".into()).into());
    }

    if let Err(e) = vw_crypto::verify(&envelope).into_result() {
        warn!(file = %envelope.file_name, "envelope rejected: {e}");
        return Err(e.into());
    }

    let (name, record) = envelope.into_record();
    state.store.store(&name, record).await?;

    info!(file = %name, "envelope accepted and stored");
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

#[derive(Debug, Deserialize)]
struct DownloadParams {
    file: String,
}

async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Result<Json<DownloadResponse>, ApiError> {
    if params.file.is_empty() {
        return Err(VwError::Input("file name is required".into()).into());
    }

    let record = state.store.retrieve(&params.file).await?;
    Ok(Json(DownloadResponse::from(record)))
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage unreachable"),
    }
}
