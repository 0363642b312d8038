//! Track pipeline: fetch, hand off to the remote pipeline, start polling.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::context::{spawn_supervised, JobContext};
use super::poller;
use super::types::JobError;
use crate::catalog::TrackMeta;
use crate::status::{JobKind, JobStatus, StatusRecord};

/// Run one track while its download ticket is held.
///
/// Returns once the hand-off finished; remote processing is followed by a
/// separate poller task.
pub(crate) async fn run(ctx: Arc<JobContext>, id: String) -> Result<(), JobError> {
    ctx.status
        .set(StatusRecord::new(&id, JobStatus::Downloading))
        .await;

    let meta = match fetch_and_hand_off(&ctx, &id).await {
        Ok(meta) => meta,
        Err(e) => {
            error!("Track {} failed before processing: {}", id, e);
            ctx.fail(StatusRecord::new(&id, JobStatus::Failed), &e).await;
            return Err(e);
        }
    };

    info!("Track {} handed off ({} - {})", id, meta.artist, meta.title);

    let poller_ctx = Arc::clone(&ctx);
    let poller_id = id.clone();
    spawn_supervised(ctx, id, JobKind::Track, async move {
        let _ = poller::run(poller_ctx, poller_id, meta).await;
    });

    Ok(())
}

async fn fetch_and_hand_off(ctx: &JobContext, id: &str) -> Result<TrackMeta, JobError> {
    let path = ctx
        .retry
        .run("media_fetch", || ctx.fetcher.fetch(id))
        .await?;
    debug!("Fetched track {} to {}", id, path.display());

    let result = ctx
        .retry
        .run("pipeline_handoff", || hand_off(ctx, id, &path))
        .await;

    remove_temp_file(&path).await;
    result
}

async fn hand_off(ctx: &JobContext, id: &str, path: &Path) -> Result<TrackMeta, JobError> {
    let payload = tokio::fs::read(path).await?;
    let meta = ctx.catalog.track_meta(id).await?;
    ctx.pipeline.submit(&meta, &payload).await?;
    Ok(meta)
}

async fn remove_temp_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove temp file {}: {}", path.display(), e);
        }
    }
}
