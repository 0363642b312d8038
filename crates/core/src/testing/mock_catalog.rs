//! Mock media catalog for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, MediaCatalog, TrackMeta};

/// Mock implementation of the MediaCatalog trait.
///
/// Unknown playlists are `NotFound`. Tracks without explicit metadata get
/// `TrackMeta { title: "Title <id>", artist: "Mock Artist" }`.
#[derive(Debug, Default)]
pub struct MockCatalog {
    playlists: Arc<RwLock<HashMap<String, Vec<String>>>>,
    metas: Arc<RwLock<HashMap<String, TrackMeta>>>,
    failing_playlists: Arc<RwLock<HashSet<String>>>,
    playlist_calls: Arc<RwLock<Vec<String>>>,
}

impl MockCatalog {
    /// Create a new mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a playlist and its ordered members.
    pub async fn set_playlist(&self, id: &str, members: Vec<String>) {
        self.playlists.write().await.insert(id.to_string(), members);
    }

    /// Register metadata for a track.
    pub async fn set_meta(&self, meta: TrackMeta) {
        self.metas.write().await.insert(meta.id.clone(), meta);
    }

    /// Fail every expansion of `id`.
    pub async fn fail_playlist(&self, id: &str) {
        self.failing_playlists.write().await.insert(id.to_string());
    }

    /// Get all recorded playlist expansions.
    pub async fn playlist_calls(&self) -> Vec<String> {
        self.playlist_calls.read().await.clone()
    }

    /// Metadata served for a track with nothing registered.
    pub fn default_meta(id: &str) -> TrackMeta {
        TrackMeta::new(id, format!("Title {}", id), "Mock Artist")
    }
}

#[async_trait]
impl MediaCatalog for MockCatalog {
    async fn playlist_entries(&self, playlist_id: &str) -> Result<Vec<String>, CatalogError> {
        self.playlist_calls
            .write()
            .await
            .push(playlist_id.to_string());

        if self.failing_playlists.read().await.contains(playlist_id) {
            return Err(CatalogError::ApiError {
                status: 503,
                message: "mock catalog failure".to_string(),
            });
        }

        self.playlists
            .read()
            .await
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(playlist_id.to_string()))
    }

    async fn track_meta(&self, track_id: &str) -> Result<TrackMeta, CatalogError> {
        Ok(self
            .metas
            .read()
            .await
            .get(track_id)
            .cloned()
            .unwrap_or_else(|| Self::default_meta(track_id)))
    }
}
