use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::catalog::CatalogConfig;
use crate::downloader::{DownloaderConfig, PlaylistConfig, ProcessingConfig};
use crate::fetcher::FetcherConfig;
use crate::remote::PipelineConfig;
use crate::retry::RetryConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    /// Remote conversion pipeline. Required.
    pub pipeline: PipelineConfig,
    /// Playlist and metadata catalog. Falls back to the pipeline host when absent.
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

impl Config {
    /// Catalog configuration, defaulting to the pipeline's base URL.
    pub fn catalog_or_default(&self) -> CatalogConfig {
        self.catalog.clone().unwrap_or_else(|| CatalogConfig {
            base_url: self.pipeline.base_url.clone(),
            timeout_secs: self.pipeline.timeout_secs,
        })
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Sanitized config for API responses (hosts reduced to whether they are set)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub downloader: SanitizedDownloaderConfig,
    pub processing: ProcessingConfig,
    pub playlist: PlaylistConfig,
    pub retry: RetryConfig,
    pub pipeline_configured: bool,
    pub catalog_configured: bool,
}

/// Downloader config without filesystem paths
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDownloaderConfig {
    pub track_id_len: usize,
    pub queue_capacity: usize,
    pub download_concurrency: usize,
    pub save_concurrency: usize,
    pub save_dir_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            downloader: SanitizedDownloaderConfig {
                track_id_len: config.downloader.track_id_len,
                queue_capacity: config.downloader.queue_capacity,
                download_concurrency: config.downloader.download_concurrency,
                save_concurrency: config.downloader.save_concurrency,
                save_dir_configured: config.downloader.save_dir != PathBuf::new(),
            },
            processing: config.processing.clone(),
            playlist: config.playlist.clone(),
            retry: config.retry.clone(),
            pipeline_configured: !config.pipeline.base_url.is_empty(),
            catalog_configured: config.catalog.is_some(),
        }
    }
}
