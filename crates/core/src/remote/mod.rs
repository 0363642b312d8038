//! External processing pipeline: hand-off, status polling, artifact download.

mod http;
mod types;

pub use http::{HttpPipelineClient, PipelineConfig};
pub use types::{ProcessingStatus, RemoteState};

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::TrackMeta;

/// Errors returned by the external pipeline.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Pipeline answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be understood.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// The remote conversion pipeline.
#[async_trait]
pub trait ProcessingPipeline: Send + Sync {
    /// Upload the raw media of a track and start processing it.
    async fn submit(&self, meta: &TrackMeta, payload: &[u8]) -> Result<(), RemoteError>;

    /// Current processing status of a submitted track.
    async fn status(&self, id: &str) -> Result<ProcessingStatus, RemoteError>;

    /// Download a finished artifact.
    async fn fetch_artifact(&self, url: &str) -> Result<Vec<u8>, RemoteError>;
}
