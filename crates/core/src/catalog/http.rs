//! HTTP media catalog client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CatalogError, MediaCatalog, PlaylistListing, TrackMeta};

/// Catalog client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL, e.g. `https://music.example.com/api`.
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

/// Catalog client speaking the `/playlist` and `/meta` endpoints.
pub struct HttpMediaCatalog {
    client: Client,
    base_url: String,
}

impl HttpMediaCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(concat!("trackforge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, id: &str) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Catalog request: {} id={}", url, id);

        let response = self.client.get(&url).query(&[("id", id)]).send().await?;
        let response = check_status(response, id).await?;

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("{} response for {}: {}", path, id, e)))
    }
}

async fn check_status(response: Response, id: &str) -> Result<Response, CatalogError> {
    let status = response.status();
    if status == 404 {
        return Err(CatalogError::NotFound(id.to_string()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(response)
}

#[async_trait]
impl MediaCatalog for HttpMediaCatalog {
    async fn playlist_entries(&self, playlist_id: &str) -> Result<Vec<String>, CatalogError> {
        let listing: PlaylistListing = self.get_json("playlist", playlist_id).await?;
        Ok(listing.tracks.into_iter().map(|t| t.id).collect())
    }

    async fn track_meta(&self, track_id: &str) -> Result<TrackMeta, CatalogError> {
        let mut meta: TrackMeta = self.get_json("meta", track_id).await?;
        if meta.id.is_empty() {
            meta.id = track_id.to_string();
        }
        Ok(meta)
    }
}
