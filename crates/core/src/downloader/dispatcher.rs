use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use super::context::{spawn_supervised, JobContext, NOT_STARTED};
use super::pool::TicketPool;
use super::{playlist, track};
use crate::status::{JobKind, JobStatus, StatusRecord};

/// Background task that drains the work queue.
///
/// Track ids wait here for a download ticket before their pipeline is
/// spawned, so a full pool holds back the whole queue. Playlist ids are
/// spawned right away.
pub struct Dispatcher {
    rx: mpsc::Receiver<String>,
    ctx: Arc<JobContext>,
    download_pool: TicketPool,
    track_id_len: usize,
    shutdown_rx: broadcast::Receiver<()>,
}

impl Dispatcher {
    pub(crate) fn new(
        rx: mpsc::Receiver<String>,
        ctx: Arc<JobContext>,
        download_pool: TicketPool,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        let track_id_len = ctx.intake.track_id_len;
        Self {
            rx,
            ctx,
            download_pool,
            track_id_len,
            shutdown_rx,
        }
    }

    /// Run until the service is stopped.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Dispatcher started");

        loop {
            let id = tokio::select! {
                _ = self.shutdown_rx.recv() => break,
                id = self.rx.recv() => match id {
                    Some(id) => id,
                    None => break,
                },
            };

            match JobKind::of(&id, self.track_id_len) {
                JobKind::Track => {
                    let ticket = tokio::select! {
                        _ = self.shutdown_rx.recv() => {
                            self.abandon(&id).await;
                            break;
                        }
                        ticket = self.download_pool.acquire() => match ticket {
                            Ok(ticket) => ticket,
                            Err(_) => {
                                self.abandon(&id).await;
                                break;
                            }
                        },
                    };

                    let ctx = Arc::clone(&self.ctx);
                    let pool = self.download_pool.clone();
                    let job_id = id.clone();
                    spawn_supervised(Arc::clone(&self.ctx), id, JobKind::Track, async move {
                        let _ticket = ticket;
                        let result = track::run(ctx, job_id).await;
                        pool.record_outcome(result.is_ok());
                    });
                }
                JobKind::Playlist => {
                    let ctx = Arc::clone(&self.ctx);
                    let job_id = id.clone();
                    spawn_supervised(Arc::clone(&self.ctx), id, JobKind::Playlist, async move {
                        let _ = playlist::run(ctx, job_id).await;
                    });
                }
            }
        }

        // Nothing will pick up what is still queued
        self.rx.close();
        while let Ok(id) = self.rx.try_recv() {
            self.abandon(&id).await;
        }

        info!("Dispatcher shutting down");
    }

    async fn abandon(&self, id: &str) {
        warn!("Job {} dropped at shutdown", id);
        self.ctx
            .status
            .set(StatusRecord::new(id, JobStatus::Failed).with_warning(NOT_STARTED))
            .await;
    }
}
