//! Types for the downloader module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::fetcher::FetchError;
use crate::remote::RemoteError;
use crate::status::StatusError;
use crate::storage::SinkError;

/// Errors returned by the inbound operations.
#[derive(Debug, Error)]
pub enum DownloaderError {
    /// Job id was empty.
    #[error("job id cannot be empty")]
    EmptyId,

    /// Dispatcher is gone.
    #[error("download queue is closed")]
    QueueClosed,

    /// Acknowledge/decline on a job that is not in `warning`.
    #[error("job {0} is not awaiting acknowledgement")]
    NotAwaitingAcknowledgement(String),

    #[error(transparent)]
    Status(#[from] StatusError),
}

/// Why a job ended in `failed`. The message becomes the record's `warning`.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("media fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("pipeline request failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("catalog request failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("artifact save failed: {0}")]
    Sink(#[from] SinkError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("status store unavailable: {0}")]
    Status(#[from] StatusError),

    #[error("enqueue failed: {0}")]
    Intake(#[from] DownloaderError),

    #[error("remote processing failed")]
    RemoteProcessingFailed,

    #[error("processing complete but no artifact url was reported")]
    MissingArtifactUrl,

    #[error("processing timed out")]
    ProcessingTimedOut,

    #[error("playlist did not finish in time")]
    AggregationTimedOut,

    #[error("warning not acknowledged, abandoning download")]
    NotAcknowledged,

    /// Operator declined; the store already recorded `failed`.
    #[error("warning declined")]
    Declined,

    #[error("ticket pool closed")]
    PoolClosed,
}

/// Status of a ticket pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Pool name ("download" or "save").
    pub name: String,
    /// Tickets currently held.
    pub active_jobs: usize,
    /// Pool capacity.
    pub max_concurrent: usize,
    /// Jobs waiting for a ticket.
    pub queued_jobs: usize,
    /// Jobs that finished successfully since startup.
    pub total_processed: u64,
    /// Jobs that failed since startup.
    pub total_failed: u64,
}

/// Overall downloader status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderStatus {
    /// Whether the dispatcher accepts work.
    pub running: bool,
    /// Ids waiting in the work queue.
    pub queue_depth: usize,
    /// Work queue capacity.
    pub queue_capacity: usize,
    pub download_pool: PoolStatus,
    pub save_pool: PoolStatus,
}
