//! Artifact storage: persists finished artifacts under their final name.

mod fs_sink;

pub use fs_sink::FsArtifactSink;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while persisting an artifact.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Artifact name would escape the storage directory.
    #[error("Invalid artifact name: {name:?}")]
    InvalidName { name: String },

    /// Failed to create the storage directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the artifact.
    #[error("Failed to write artifact: {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for finished artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `bytes` under `name`, replacing any previous artifact of that name.
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError>;
}
