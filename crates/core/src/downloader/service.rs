use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use super::config::{PlaylistPolicy, ProcessingPolicy};
use super::context::{Intake, JobContext};
use super::dispatcher::Dispatcher;
use super::pool::TicketPool;
use super::types::{DownloaderError, DownloaderStatus};
use crate::catalog::MediaCatalog;
use crate::config::Config;
use crate::fetcher::MediaFetcher;
use crate::remote::ProcessingPipeline;
use crate::retry::RetryPolicy;
use crate::status::{JobKind, StatusHandle, StatusRecord};
use crate::storage::ArtifactSink;

/// Runtime options of the download service.
#[derive(Debug, Clone)]
pub struct DownloaderOptions {
    pub track_id_len: usize,
    pub queue_capacity: usize,
    pub download_concurrency: usize,
    pub save_concurrency: usize,
    pub artifact_extension: String,
    pub retry: RetryPolicy,
    pub processing: ProcessingPolicy,
    pub playlist: PlaylistPolicy,
}

impl DownloaderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            track_id_len: config.downloader.track_id_len,
            queue_capacity: config.downloader.queue_capacity,
            download_concurrency: config.downloader.download_concurrency,
            save_concurrency: config.downloader.save_concurrency,
            artifact_extension: config.downloader.artifact_extension.clone(),
            retry: RetryPolicy::from(&config.retry),
            processing: ProcessingPolicy::from(&config.processing),
            playlist: PlaylistPolicy::from(&config.playlist),
        }
    }
}

/// External systems the jobs talk to.
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn MediaFetcher>,
    pub pipeline: Arc<dyn ProcessingPipeline>,
    pub catalog: Arc<dyn MediaCatalog>,
    pub sink: Arc<dyn ArtifactSink>,
}

struct ServiceInner {
    intake: Intake,
    status: StatusHandle,
    download_pool: TicketPool,
    save_pool: TicketPool,
    queue_capacity: usize,
    running: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

/// Inbound operations of the downloader.
///
/// Cheap to clone; all clones drive the same dispatcher.
#[derive(Clone)]
pub struct DownloadService {
    inner: Arc<ServiceInner>,
}

impl DownloadService {
    /// Build the service and its dispatcher.
    ///
    /// Spawn the dispatcher with `tokio::spawn(dispatcher.run())`.
    pub fn new(
        options: DownloaderOptions,
        collaborators: Collaborators,
        status: StatusHandle,
    ) -> (Self, Dispatcher) {
        let (queue_tx, queue_rx) = mpsc::channel(options.queue_capacity);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let intake = Intake {
            status: status.clone(),
            queue_tx,
            track_id_len: options.track_id_len,
        };
        let download_pool = TicketPool::new("download", options.download_concurrency);
        let save_pool = TicketPool::new("save", options.save_concurrency);

        let ctx = Arc::new(JobContext {
            status: status.clone(),
            intake: intake.clone(),
            fetcher: collaborators.fetcher,
            pipeline: collaborators.pipeline,
            catalog: collaborators.catalog,
            sink: collaborators.sink,
            retry: options.retry,
            processing: options.processing,
            playlist: options.playlist,
            save_pool: save_pool.clone(),
            artifact_extension: options.artifact_extension,
        });

        let dispatcher = Dispatcher::new(queue_rx, ctx, download_pool.clone(), shutdown_rx);
        let service = Self {
            inner: Arc::new(ServiceInner {
                intake,
                status,
                download_pool,
                save_pool,
                queue_capacity: options.queue_capacity,
                running: AtomicBool::new(true),
                shutdown_tx,
            }),
        };

        (service, dispatcher)
    }

    /// Accept a track or playlist id for processing.
    ///
    /// Records `queued` and enqueues the id, waiting while the queue is full.
    pub async fn initiate_download(&self, id: &str) -> Result<JobKind, DownloaderError> {
        if !self.inner.running.load(Ordering::SeqCst) {
            return Err(DownloaderError::QueueClosed);
        }
        self.inner.intake.submit(id).await
    }

    /// Current record of a job; never-seen ids report `queued`.
    pub async fn get_status(&self, id: &str) -> Result<StatusRecord, DownloaderError> {
        Ok(self.inner.status.get(id).await?)
    }

    /// Let a playlist waiting on its size warning proceed.
    pub async fn acknowledge_warning(&self, id: &str) -> Result<(), DownloaderError> {
        self.resolve(id, true).await
    }

    /// Abandon a playlist waiting on its size warning.
    pub async fn decline_warning(&self, id: &str) -> Result<(), DownloaderError> {
        self.resolve(id, false).await
    }

    async fn resolve(&self, id: &str, accept: bool) -> Result<(), DownloaderError> {
        if self.inner.status.resolve_warning(id, accept).await? {
            tracing::info!(
                "Playlist {} warning {}",
                id,
                if accept { "acknowledged" } else { "declined" }
            );
            Ok(())
        } else {
            Err(DownloaderError::NotAwaitingAcknowledgement(id.to_string()))
        }
    }

    pub fn pool_status(&self) -> DownloaderStatus {
        let tx = &self.inner.intake.queue_tx;
        DownloaderStatus {
            running: self.inner.running.load(Ordering::SeqCst),
            queue_depth: tx.max_capacity() - tx.capacity(),
            queue_capacity: self.inner.queue_capacity,
            download_pool: self.inner.download_pool.status(),
            save_pool: self.inner.save_pool.status(),
        }
    }

    /// Stop the dispatcher. Jobs already running finish on their own.
    pub fn stop(&self) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            tracing::warn!("Download service not running");
            return;
        }
        tracing::info!("Stopping download service");
        let _ = self.inner.shutdown_tx.send(());
    }
}
