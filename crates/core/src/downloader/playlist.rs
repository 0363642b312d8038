//! Playlist orchestrator: expansion, size gate, fan-out and aggregation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use super::context::JobContext;
use super::types::JobError;
use crate::status::{JobStatus, StatusRecord};

/// Prompt recorded while a large playlist waits for confirmation.
pub fn size_warning(len: usize) -> String {
    format!(
        "Playlist length is {}, downloading this many tracks may result in a ban. \
         Are you sure you want to continue?",
        len
    )
}

pub(crate) async fn run(ctx: Arc<JobContext>, id: String) -> Result<(), JobError> {
    ctx.status
        .set(StatusRecord::new(&id, JobStatus::Queued))
        .await;

    let result = orchestrate(&ctx, &id).await;
    match &result {
        Ok(()) => info!("Playlist {} complete", id),
        // The store already recorded the outcome
        Err(JobError::Declined) => info!("Playlist {} declined by operator", id),
        Err(JobError::NotAcknowledged) => info!("Playlist {} not acknowledged in time", id),
        Err(e) => {
            error!("Playlist {} failed: {}", id, e);
            ctx.fail(StatusRecord::new(&id, JobStatus::Failed), e).await;
        }
    }
    result
}

async fn orchestrate(ctx: &JobContext, id: &str) -> Result<(), JobError> {
    let mut members = ctx
        .retry
        .run("playlist_expand", || ctx.catalog.playlist_entries(id))
        .await?;

    let listed = members.len();
    let mut seen = HashSet::new();
    members.retain(|m| m != id && seen.insert(m.clone()));
    if members.len() < listed {
        warn!(
            "Playlist {} skipped {} repeated or self-referencing entries",
            id,
            listed - members.len()
        );
    }

    let total = members.len();
    info!("Playlist {} has {} tracks", id, total);

    if total > ctx.playlist.warning_threshold {
        await_acknowledgement(ctx, id, total).await?;
    }

    for member in &members {
        ctx.intake.submit(member).await?;
    }

    ctx.status
        .set(StatusRecord::new(id, JobStatus::Downloading).with_playlist_total(total))
        .await;

    aggregate(ctx, id, &members).await
}

/// Hold the playlist in `warning` until the operator accepts or declines.
async fn await_acknowledgement(ctx: &JobContext, id: &str, total: usize) -> Result<(), JobError> {
    ctx.status
        .set(
            StatusRecord::new(id, JobStatus::Warning)
                .with_warning(size_warning(total))
                .with_playlist_total(total),
        )
        .await;

    let deadline = Instant::now() + ctx.playlist.ack_timeout;
    loop {
        sleep(until(deadline, ctx.playlist.ack_poll_interval)).await;

        match ctx.status.get(id).await?.status {
            JobStatus::WarningAck => {
                info!("Playlist {} acknowledged", id);
                return Ok(());
            }
            JobStatus::Failed => return Err(JobError::Declined),
            status => debug!("Playlist {} still {}", id, status),
        }

        if Instant::now() >= deadline {
            let expired = StatusRecord::new(id, JobStatus::Failed)
                .with_warning(JobError::NotAcknowledged.to_string());
            if ctx.status.replace_if(JobStatus::Warning, expired).await? {
                return Err(JobError::NotAcknowledged);
            }

            // The operator answered after the last read
            return match ctx.status.get(id).await?.status {
                JobStatus::WarningAck => Ok(()),
                _ => Err(JobError::Declined),
            };
        }
    }
}

/// Publish progress until every member is terminal.
async fn aggregate(ctx: &JobContext, id: &str, members: &[String]) -> Result<(), JobError> {
    let total = members.len();
    let deadline = Instant::now() + ctx.playlist.aggregation_timeout;

    loop {
        let records = join_all(members.iter().map(|m| ctx.status.get(m))).await;
        let mut done = 0;
        for record in records {
            if record?.status.is_terminal() {
                done += 1;
            }
        }

        ctx.status
            .set(StatusRecord::new(id, JobStatus::Processing).with_playlist_progress(total, done))
            .await;

        if done == total {
            ctx.status
                .set(StatusRecord::new(id, JobStatus::Complete).with_playlist_progress(total, done))
                .await;
            return Ok(());
        }

        if Instant::now() >= deadline {
            return Err(JobError::AggregationTimedOut);
        }

        sleep(until(deadline, ctx.playlist.aggregation_poll_interval)).await;
    }
}

fn until(deadline: Instant, interval: Duration) -> Duration {
    interval.min(deadline.saturating_duration_since(Instant::now()))
}
