//! Media catalog: playlist expansion and track metadata lookup.

mod http;
mod types;

pub use http::{CatalogConfig, HttpMediaCatalog};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Source of playlist listings and track metadata.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Ordered member track ids of a playlist.
    async fn playlist_entries(&self, playlist_id: &str) -> Result<Vec<String>, CatalogError>;

    /// Best metadata available for a track.
    async fn track_meta(&self, track_id: &str) -> Result<TrackMeta, CatalogError>;
}
