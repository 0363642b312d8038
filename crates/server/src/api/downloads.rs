//! Download API handlers.
//!
//! Every operation takes the job id as the `id` query parameter so a
//! browser extension can drive the service with plain GET requests.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trackforge_core::{DownloaderError, DownloaderStatus, StatusRecord};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters naming a job
#[derive(Debug, Deserialize)]
pub struct IdParams {
    pub id: Option<String>,
}

impl IdParams {
    fn require(self) -> Result<String, ApiError> {
        match self.id.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(error(StatusCode::BAD_REQUEST, "missing id parameter")),
        }
    }
}

/// Acknowledgement returned by accepted operations
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub state: &'static str,
}

impl AckResponse {
    fn ack() -> Json<Self> {
        Json(Self { state: "ACK" })
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct DownloadErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<DownloadErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(DownloadErrorResponse {
            error: message.into(),
        }),
    )
}

fn map_error(e: DownloaderError) -> ApiError {
    let status = match &e {
        DownloaderError::EmptyId => StatusCode::BAD_REQUEST,
        DownloaderError::NotAwaitingAcknowledgement(_) => StatusCode::CONFLICT,
        DownloaderError::QueueClosed | DownloaderError::Status(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    error(status, e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// Accept a track or playlist id
pub async fn initiate_download(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<AckResponse>, ApiError> {
    let id = params.require()?;
    let kind = state
        .service()
        .initiate_download(&id)
        .await
        .map_err(map_error)?;
    tracing::info!("Accepted {} {}", kind.as_str(), id);
    Ok(AckResponse::ack())
}

/// Current status record of a job
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<StatusRecord>, ApiError> {
    let id = params.require()?;
    let record = state.service().get_status(&id).await.map_err(map_error)?;
    Ok(Json(record))
}

/// Let a playlist held by its size warning proceed
pub async fn acknowledge_warning(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<AckResponse>, ApiError> {
    let id = params.require()?;
    state
        .service()
        .acknowledge_warning(&id)
        .await
        .map_err(map_error)?;
    Ok(AckResponse::ack())
}

/// Abandon a playlist held by its size warning
pub async fn decline_warning(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<AckResponse>, ApiError> {
    let id = params.require()?;
    state
        .service()
        .decline_warning(&id)
        .await
        .map_err(map_error)?;
    Ok(AckResponse::ack())
}

/// Queue and pool status
pub async fn downloader_status(State(state): State<Arc<AppState>>) -> Json<DownloaderStatus> {
    Json(state.service().pool_status())
}
