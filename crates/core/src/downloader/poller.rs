//! Remote processing poller.
//!
//! Follows one submitted track until the pipeline reports a terminal state
//! or the processing deadline passes. A `complete` report is only published
//! after the artifact has been saved.

use std::sync::Arc;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info};

use super::context::JobContext;
use super::types::JobError;
use crate::catalog::TrackMeta;
use crate::metrics::{PROCESSING_POLLS, PROCESSING_TIMEOUTS};
use crate::remote::{ProcessingStatus, RemoteState};
use crate::status::{JobStatus, StatusRecord};

pub(crate) async fn run(ctx: Arc<JobContext>, id: String, meta: TrackMeta) -> Result<(), JobError> {
    let record = |status| StatusRecord::new(&id, status).with_track(&meta);
    let deadline = Instant::now() + ctx.processing.timeout;

    ctx.status.set(record(JobStatus::Processing)).await;

    loop {
        if Instant::now() >= deadline {
            PROCESSING_TIMEOUTS.inc();
            let err = JobError::ProcessingTimedOut;
            error!("Track {}: {}", id, err);
            ctx.fail(record(JobStatus::Failed), &err).await;
            return Err(err);
        }

        PROCESSING_POLLS.inc();
        let remote = match ctx
            .retry
            .run("processing_status", || ctx.pipeline.status(&id))
            .await
        {
            Ok(remote) => remote,
            Err(e) => {
                let err = JobError::from(e);
                error!("Track {}: {}", id, err);
                ctx.fail(record(JobStatus::Failed), &err).await;
                return Err(err);
            }
        };
        debug!("Track {} remote state {:?}", id, remote.status);

        match remote.status {
            RemoteState::Complete => {
                return match save_artifact(&ctx, &meta, &remote).await {
                    Ok(file_name) => {
                        info!("Track {} saved as {}", id, file_name);
                        ctx.status
                            .set(record(JobStatus::Complete).with_file_name(file_name))
                            .await;
                        Ok(())
                    }
                    Err(err) => {
                        error!("Track {}: {}", id, err);
                        ctx.fail(record(JobStatus::Failed), &err).await;
                        Err(err)
                    }
                };
            }
            RemoteState::Failed => {
                let err = JobError::RemoteProcessingFailed;
                error!("Track {}: {}", id, err);
                ctx.fail(record(JobStatus::Failed), &err).await;
                return Err(err);
            }
            RemoteState::Queued | RemoteState::Processing => {
                ctx.status.set(record(JobStatus::Processing)).await;
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        sleep(ctx.processing.poll_interval.min(remaining)).await;
    }
}

/// Download and store the finished artifact while holding a save ticket.
async fn save_artifact(
    ctx: &JobContext,
    meta: &TrackMeta,
    remote: &ProcessingStatus,
) -> Result<String, JobError> {
    let url = remote
        .file_url
        .as_deref()
        .ok_or(JobError::MissingArtifactUrl)?;
    let extension = remote
        .file_extension()
        .unwrap_or(ctx.artifact_extension.as_str());
    let file_name = meta.artifact_name(extension);

    let _ticket = ctx.save_pool.acquire().await?;
    let result = download_and_store(ctx, url, &file_name).await;
    ctx.save_pool.record_outcome(result.is_ok());
    result.map(|_| file_name)
}

async fn download_and_store(ctx: &JobContext, url: &str, file_name: &str) -> Result<(), JobError> {
    let bytes = ctx
        .retry
        .run("artifact_download", || ctx.pipeline.fetch_artifact(url))
        .await?;
    ctx.retry
        .run("artifact_save", || ctx.sink.save(file_name, &bytes))
        .await?;
    Ok(())
}
