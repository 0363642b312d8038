//! Media fetcher: obtains a track's raw media into a local temp file.
//!
//! The production implementation runs an external program per track and
//! expects it to leave the media at `<temp_dir>/<id>`.

mod config;
mod process;

pub use config::FetcherConfig;
pub use process::ProcessFetcher;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching media.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Fetch program not found.
    #[error("Fetch program not found at path: {path}")]
    ProgramNotFound { path: PathBuf },

    /// Id cannot be used as a file name.
    #[error("Invalid track id: {id:?}")]
    InvalidId { id: String },

    /// Program exited unsuccessfully.
    #[error("Fetch failed for {id}: exit code {code:?}")]
    Failed {
        id: String,
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// Program exceeded its timeout.
    #[error("Fetch timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Program succeeded but left no media behind.
    #[error("Fetched media not found: {path}")]
    MissingOutput { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can place a track's raw media in a local file.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the media of track `id`, returning the path of the temp file.
    async fn fetch(&self, id: &str) -> Result<PathBuf, FetchError>;
}
