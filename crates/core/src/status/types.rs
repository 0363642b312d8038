//! Job status types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::TrackMeta;

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Downloading,
    Processing,
    /// Playlist waiting for operator confirmation.
    Warning,
    /// Operator confirmed a playlist warning.
    WarningAck,
    Complete,
    Failed,
}

impl JobStatus {
    /// `complete` and `failed` admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Downloading => "downloading",
            JobStatus::Processing => "processing",
            JobStatus::Warning => "warning",
            JobStatus::WarningAck => "warning_ack",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pipeline a job id is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Track,
    Playlist,
}

impl JobKind {
    /// Track ids have exactly `track_id_len` characters; anything else is a playlist.
    pub fn of(id: &str, track_id_len: usize) -> Self {
        if id.len() == track_id_len {
            JobKind::Track
        } else {
            JobKind::Playlist
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Track => "track",
            JobKind::Playlist => "playlist",
        }
    }
}

/// The single live status record of a job.
///
/// Writes replace the whole record; fields the writer does not set are gone
/// after the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_done: Option<usize>,
    /// Warning prompt or failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Name of the persisted artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StatusRecord {
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            playlist_total: None,
            playlist_done: None,
            warning: None,
            title: None,
            artist: None,
            file_name: None,
            updated_at: Utc::now(),
        }
    }

    /// Record reported for ids the store has never seen.
    pub fn queued(id: impl Into<String>) -> Self {
        Self::new(id, JobStatus::Queued)
    }

    pub fn with_warning(mut self, message: impl Into<String>) -> Self {
        self.warning = Some(message.into());
        self
    }

    pub fn with_playlist_total(mut self, total: usize) -> Self {
        self.playlist_total = Some(total);
        self
    }

    pub fn with_playlist_progress(mut self, total: usize, done: usize) -> Self {
        self.playlist_total = Some(total);
        self.playlist_done = Some(done);
        self
    }

    pub fn with_track(mut self, meta: &TrackMeta) -> Self {
        self.title = Some(meta.title.clone());
        self.artist = Some(meta.artist.clone());
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}
