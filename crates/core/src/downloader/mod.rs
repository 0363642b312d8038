//! Downloader: task intake, worker pool, track and playlist pipelines.
//!
//! Ids enter through [`DownloadService::initiate_download`] and land on a
//! bounded work queue. The [`Dispatcher`] drains it, routing ids by length:
//!
//! - Tracks wait for a download ticket, then fetch the media, hand it to the
//!   remote pipeline and start a poller that saves the finished artifact
//!   under a save ticket.
//! - Playlists expand into member tracks, optionally wait for the operator
//!   to confirm a large playlist, enqueue the members and report aggregate
//!   progress until every member is terminal.
//!
//! All status changes go through the status store.

mod config;
mod context;
mod dispatcher;
mod playlist;
mod poller;
mod pool;
mod service;
mod track;
mod types;

pub use config::{
    DownloaderConfig, PlaylistConfig, PlaylistPolicy, ProcessingConfig, ProcessingPolicy,
};
pub use dispatcher::Dispatcher;
pub use playlist::size_warning;
pub use service::{Collaborators, DownloadService, DownloaderOptions};
pub use types::{DownloaderError, DownloaderStatus, JobError, PoolStatus};
