//! State shared by every job task.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::config::{PlaylistPolicy, ProcessingPolicy};
use super::pool::TicketPool;
use super::types::{DownloaderError, JobError};
use crate::catalog::MediaCatalog;
use crate::fetcher::MediaFetcher;
use crate::metrics::JOBS_INITIATED;
use crate::remote::ProcessingPipeline;
use crate::retry::RetryPolicy;
use crate::status::{JobKind, JobStatus, StatusHandle, StatusRecord};
use crate::storage::ArtifactSink;

/// Failure reason for ids the dispatcher never got to.
pub(crate) const NOT_STARTED: &str = "downloader stopped before the job started";

/// Entry point of the work queue, shared by the service and playlist fan-out.
#[derive(Clone)]
pub(crate) struct Intake {
    pub status: StatusHandle,
    pub queue_tx: mpsc::Sender<String>,
    pub track_id_len: usize,
}

impl Intake {
    /// Record `queued` for `id` and put it on the work queue.
    ///
    /// Waits while the queue is full. An id that is already queued or
    /// running is acknowledged without starting a second pipeline.
    pub async fn submit(&self, id: &str) -> Result<JobKind, DownloaderError> {
        if id.trim().is_empty() {
            return Err(DownloaderError::EmptyId);
        }

        let kind = JobKind::of(id, self.track_id_len);
        if !self.status.requeue(id).await? {
            tracing::info!("{} job {} already in flight", kind.as_str(), id);
            return Ok(kind);
        }

        if self.queue_tx.send(id.to_string()).await.is_err() {
            self.status
                .set(StatusRecord::new(id, JobStatus::Failed).with_warning(NOT_STARTED))
                .await;
            return Err(DownloaderError::QueueClosed);
        }

        JOBS_INITIATED.with_label_values(&[kind.as_str()]).inc();
        tracing::info!("Accepted {} job {}", kind.as_str(), id);
        Ok(kind)
    }
}

pub(crate) struct JobContext {
    pub status: StatusHandle,
    pub intake: Intake,
    pub fetcher: Arc<dyn MediaFetcher>,
    pub pipeline: Arc<dyn ProcessingPipeline>,
    pub catalog: Arc<dyn MediaCatalog>,
    pub sink: Arc<dyn ArtifactSink>,
    pub retry: RetryPolicy,
    pub processing: ProcessingPolicy,
    pub playlist: PlaylistPolicy,
    pub save_pool: TicketPool,
    pub artifact_extension: String,
}

impl JobContext {
    /// Record `failed` with the error text as the reason.
    pub async fn fail(&self, record: StatusRecord, err: &JobError) {
        let mut record = record.with_warning(err.to_string());
        record.status = JobStatus::Failed;
        self.status.set(record).await;
    }
}

/// Run a job on its own task, recording `failed` if it panics.
pub(crate) fn spawn_supervised<F>(ctx: Arc<JobContext>, id: String, kind: JobKind, job: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = tokio::spawn(job).await {
            if e.is_panic() {
                tracing::error!("{} job {} panicked", kind.as_str(), id);
                ctx.status
                    .set(
                        StatusRecord::new(&id, JobStatus::Failed)
                            .with_warning("internal error while processing job"),
                    )
                    .await;
            }
        }
    });
}
