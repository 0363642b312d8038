//! Configuration for intake, pools, polling and the playlist gate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Intake and worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Ids of exactly this length are tracks, anything else is a playlist.
    #[serde(default = "default_track_id_len")]
    pub track_id_len: usize,

    /// Capacity of the work queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Track pipelines allowed to run at once.
    #[serde(default = "default_download_concurrency")]
    pub download_concurrency: usize,

    /// Artifact saves allowed to run at once.
    #[serde(default = "default_save_concurrency")]
    pub save_concurrency: usize,

    /// Directory finished artifacts are stored in.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Artifact extension used when the pipeline reports no file name.
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,

    /// Buffer of the status store channel.
    #[serde(default = "default_status_buffer")]
    pub status_buffer: usize,
}

fn default_track_id_len() -> usize {
    11
}

fn default_queue_capacity() -> usize {
    5000
}

fn default_download_concurrency() -> usize {
    4
}

fn default_save_concurrency() -> usize {
    4
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_artifact_extension() -> String {
    "mp3".to_string()
}

fn default_status_buffer() -> usize {
    1024
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            track_id_len: default_track_id_len(),
            queue_capacity: default_queue_capacity(),
            download_concurrency: default_download_concurrency(),
            save_concurrency: default_save_concurrency(),
            save_dir: default_save_dir(),
            artifact_extension: default_artifact_extension(),
            status_buffer: default_status_buffer(),
        }
    }
}

/// Remote processing poller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Delay between status polls in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Give up on remote processing after this many seconds.
    #[serde(default = "default_processing_timeout")]
    pub timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    10_000 // 10 seconds
}

fn default_processing_timeout() -> u64 {
    3600 // 1 hour
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            timeout_secs: default_processing_timeout(),
        }
    }
}

/// Playlist orchestration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistConfig {
    /// Playlists with more members than this wait for acknowledgement.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: usize,

    /// How often the gate checks for an acknowledgement, in milliseconds.
    #[serde(default = "default_ack_poll_interval")]
    pub ack_poll_interval_ms: u64,

    /// How long the gate waits for an acknowledgement, in seconds.
    #[serde(default = "default_ack_timeout")]
    pub ack_timeout_secs: u64,

    /// Delay between member status sweeps in milliseconds.
    #[serde(default = "default_aggregation_poll_interval")]
    pub aggregation_poll_interval_ms: u64,

    /// Give up waiting for members after this many seconds.
    #[serde(default = "default_aggregation_timeout")]
    pub aggregation_timeout_secs: u64,
}

fn default_warning_threshold() -> usize {
    10
}

fn default_ack_poll_interval() -> u64 {
    10_000
}

fn default_ack_timeout() -> u64 {
    600 // 10 minutes
}

fn default_aggregation_poll_interval() -> u64 {
    10_000
}

fn default_aggregation_timeout() -> u64 {
    21_600 // 6 hours
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            warning_threshold: default_warning_threshold(),
            ack_poll_interval_ms: default_ack_poll_interval(),
            ack_timeout_secs: default_ack_timeout(),
            aggregation_poll_interval_ms: default_aggregation_poll_interval(),
            aggregation_timeout_secs: default_aggregation_timeout(),
        }
    }
}

/// Poller timings.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl From<&ProcessingConfig> for ProcessingPolicy {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for ProcessingPolicy {
    fn default() -> Self {
        Self::from(&ProcessingConfig::default())
    }
}

/// Playlist gate and aggregation timings.
#[derive(Debug, Clone, Copy)]
pub struct PlaylistPolicy {
    pub warning_threshold: usize,
    pub ack_poll_interval: Duration,
    pub ack_timeout: Duration,
    pub aggregation_poll_interval: Duration,
    pub aggregation_timeout: Duration,
}

impl From<&PlaylistConfig> for PlaylistPolicy {
    fn from(config: &PlaylistConfig) -> Self {
        Self {
            warning_threshold: config.warning_threshold,
            ack_poll_interval: Duration::from_millis(config.ack_poll_interval_ms),
            ack_timeout: Duration::from_secs(config.ack_timeout_secs),
            aggregation_poll_interval: Duration::from_millis(config.aggregation_poll_interval_ms),
            aggregation_timeout: Duration::from_secs(config.aggregation_timeout_secs),
        }
    }
}

impl Default for PlaylistPolicy {
    fn default() -> Self {
        Self::from(&PlaylistConfig::default())
    }
}
