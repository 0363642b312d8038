//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every collaborator trait,
//! allowing the whole downloader to be exercised without external services.
//!
//! # Example
//!
//! ```rust,ignore
//! use trackforge_core::testing::{MockCatalog, MockFetcher, MockPipeline, MockArtifactSink};
//!
//! let catalog = MockCatalog::new();
//! catalog.set_playlist("PL1", vec![fixtures::track_id(1)]).await;
//!
//! let pipeline = MockPipeline::new();
//! pipeline.complete_after(&fixtures::track_id(1), 2).await;
//! ```

mod mock_catalog;
mod mock_fetcher;
mod mock_pipeline;
mod mock_sink;

pub use mock_catalog::MockCatalog;
pub use mock_fetcher::MockFetcher;
pub use mock_pipeline::{artifact_url, MockPipeline, RecordedSubmission};
pub use mock_sink::{MockArtifactSink, RecordedSave};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::TrackMeta;
    use crate::remote::{ProcessingStatus, RemoteState};

    /// An 11-character track id.
    pub fn track_id(n: usize) -> String {
        format!("trk{:08}", n)
    }

    /// `count` distinct track ids starting at `first`.
    pub fn track_ids(first: usize, count: usize) -> Vec<String> {
        (first..first + count).map(track_id).collect()
    }

    /// A playlist id (never 11 characters).
    pub fn playlist_id(n: usize) -> String {
        format!("PL{:016}", n)
    }

    /// Track metadata with an album set.
    pub fn track_meta(id: &str, title: &str, artist: &str) -> TrackMeta {
        TrackMeta {
            album: Some(format!("{} - Greatest Hits", artist)),
            ..TrackMeta::new(id, title, artist)
        }
    }

    /// A `processing` report.
    pub fn processing(id: &str) -> ProcessingStatus {
        ProcessingStatus::new(id, RemoteState::Processing)
    }

    /// A `complete` report with an artifact url.
    pub fn complete(id: &str, file_name: &str) -> ProcessingStatus {
        ProcessingStatus::complete(id, format!("mock://artifacts/{}", id), file_name)
    }

    /// A `failed` report.
    pub fn failed(id: &str) -> ProcessingStatus {
        ProcessingStatus::new(id, RemoteState::Failed)
    }
}
