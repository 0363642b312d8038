use tokio::sync::{mpsc, oneshot};

use super::{JobStatus, StatusError, StatusRecord};

/// Message consumed by the status store loop.
#[derive(Debug)]
pub enum StatusMessage {
    /// Replace the record of `record.id`. Rejected when the job is terminal.
    Update(StatusRecord),
    /// Start a new lifecycle for `id` unless one is already running.
    /// Replies true when `queued` was recorded.
    Requeue {
        id: String,
        reply: oneshot::Sender<bool>,
    },
    /// Replace the record only while the job is still in `expected`.
    /// Replies whether the write was applied.
    ReplaceIf {
        expected: JobStatus,
        record: StatusRecord,
        reply: oneshot::Sender<bool>,
    },
    /// Operator decision on a playlist size warning.
    /// Replies whether the job was awaiting a decision.
    Resolve {
        id: String,
        accept: bool,
        reply: oneshot::Sender<bool>,
    },
    /// Read the current record (response sent via oneshot channel).
    Query {
        id: String,
        reply: oneshot::Sender<StatusRecord>,
    },
}

/// Handle for talking to the status store
///
/// This is cheaply cloneable and can be shared across tasks.
/// Writes are fire-and-forget; reads wait for the store loop to answer.
#[derive(Clone)]
pub struct StatusHandle {
    tx: mpsc::Sender<StatusMessage>,
}

impl StatusHandle {
    /// Create a new status handle from a channel sender
    pub fn new(tx: mpsc::Sender<StatusMessage>) -> Self {
        Self { tx }
    }

    /// Write a status record
    ///
    /// Waits for channel capacity. If the store is gone the error is logged
    /// but the caller is not failed.
    pub async fn set(&self, record: StatusRecord) {
        if let Err(e) = self.tx.send(StatusMessage::Update(record)).await {
            tracing::error!("Failed to send status update: {}", e);
        }
    }

    /// Record `queued` for a job entering intake
    ///
    /// Returns false, without writing, when `id` is already in flight.
    /// Never-seen and terminal ids start over.
    pub async fn requeue(&self, id: &str) -> Result<bool, StatusError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(StatusMessage::Requeue {
                id: id.to_string(),
                reply,
            })
            .await
            .map_err(|_| StatusError::StoreClosed)?;
        rx.await.map_err(|_| StatusError::StoreClosed)
    }

    /// Write `record` only if its job is currently in `expected`
    pub async fn replace_if(
        &self,
        expected: JobStatus,
        record: StatusRecord,
    ) -> Result<bool, StatusError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(StatusMessage::ReplaceIf {
                expected,
                record,
                reply,
            })
            .await
            .map_err(|_| StatusError::StoreClosed)?;
        rx.await.map_err(|_| StatusError::StoreClosed)
    }

    /// Read the current record of `id`
    ///
    /// Never-seen ids resolve to a `queued` record.
    pub async fn get(&self, id: &str) -> Result<StatusRecord, StatusError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(StatusMessage::Query {
                id: id.to_string(),
                reply,
            })
            .await
            .map_err(|_| StatusError::StoreClosed)?;
        rx.await.map_err(|_| StatusError::StoreClosed)
    }

    /// Accept or decline a pending playlist warning
    ///
    /// Returns false when the job is not in `warning`.
    pub async fn resolve_warning(&self, id: &str, accept: bool) -> Result<bool, StatusError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(StatusMessage::Resolve {
                id: id.to_string(),
                accept,
                reply,
            })
            .await
            .map_err(|_| StatusError::StoreClosed)?;
        rx.await.map_err(|_| StatusError::StoreClosed)
    }
}
