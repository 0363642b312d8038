use std::collections::HashMap;

use tokio::sync::mpsc;

use super::{JobStatus, StatusHandle, StatusMessage, StatusRecord};
use crate::metrics::{JOBS_FINISHED, REJECTED_STATUS_WRITES};

/// Failure text written when an operator declines a playlist warning.
pub const WARNING_DECLINED: &str = "warning declined, abandoning download";

/// Background task that owns every job status record.
///
/// All writes and reads go through its channel, so each request observes
/// the effect of every request accepted before it.
pub struct StatusStore {
    rx: mpsc::Receiver<StatusMessage>,
    records: HashMap<String, StatusRecord>,
    observer: Option<mpsc::UnboundedSender<StatusRecord>>,
}

impl StatusStore {
    /// Create a new status store
    pub fn new(rx: mpsc::Receiver<StatusMessage>) -> Self {
        Self {
            rx,
            records: HashMap::new(),
            observer: None,
        }
    }

    /// Receive a copy of every record the store accepts, in apply order.
    pub fn with_observer(mut self, observer: mpsc::UnboundedSender<StatusRecord>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn accept(&mut self, record: StatusRecord) {
        if let Some(observer) = &self.observer {
            if observer.send(record.clone()).is_err() {
                self.observer = None;
            }
        }
        self.records.insert(record.id.clone(), record);
    }

    /// Run the store, consuming messages until every handle is dropped
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("Status store started");

        while let Some(msg) = self.rx.recv().await {
            self.apply(msg);
        }

        tracing::info!(
            "Status store shutting down with {} records",
            self.records.len()
        );
    }

    fn apply(&mut self, msg: StatusMessage) {
        match msg {
            StatusMessage::Update(record) => self.update(record),
            StatusMessage::Requeue { id, reply } => {
                let in_flight = self
                    .records
                    .get(&id)
                    .is_some_and(|r| !r.status.is_terminal());

                if in_flight {
                    tracing::debug!("Job {} already in flight, not requeued", id);
                } else {
                    tracing::debug!("Job {} queued", id);
                    self.accept(StatusRecord::queued(id));
                }

                let _ = reply.send(!in_flight);
            }
            StatusMessage::ReplaceIf {
                expected,
                record,
                reply,
            } => {
                let matches = self
                    .records
                    .get(&record.id)
                    .is_some_and(|r| r.status == expected);

                if matches {
                    self.update(record);
                } else {
                    tracing::debug!("Job {} left {}, write skipped", record.id, expected);
                }

                let _ = reply.send(matches);
            }
            StatusMessage::Resolve { id, accept, reply } => {
                let awaiting = self
                    .records
                    .get(&id)
                    .is_some_and(|r| r.status == JobStatus::Warning);

                if awaiting {
                    let record = if accept {
                        StatusRecord::new(&id, JobStatus::WarningAck)
                    } else {
                        StatusRecord::new(&id, JobStatus::Failed).with_warning(WARNING_DECLINED)
                    };
                    self.update(record);
                } else {
                    tracing::debug!("Job {} is not awaiting acknowledgement", id);
                }

                let _ = reply.send(awaiting);
            }
            StatusMessage::Query { id, reply } => {
                let record = self
                    .records
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| StatusRecord::queued(&id));
                let _ = reply.send(record);
            }
        }
    }

    fn update(&mut self, record: StatusRecord) {
        if let Some(current) = self.records.get(&record.id) {
            if current.status.is_terminal() {
                tracing::warn!(
                    "Rejected status write for job {}: {} -> {}",
                    record.id,
                    current.status,
                    record.status
                );
                REJECTED_STATUS_WRITES.inc();
                return;
            }
        }

        if record.status.is_terminal() {
            match &record.warning {
                Some(reason) => tracing::info!(
                    "Job {} finished as {}: {}",
                    record.id,
                    record.status,
                    reason
                ),
                None => tracing::info!("Job {} finished as {}", record.id, record.status),
            }
            JOBS_FINISHED
                .with_label_values(&[record.status.as_str()])
                .inc();
        } else {
            tracing::debug!("Job {} -> {}", record.id, record.status);
        }

        self.accept(record);
    }
}

/// Create a complete status system
///
/// Returns:
/// - `StatusHandle` - for reading and writing records (clone this to share across tasks)
/// - `StatusStore` - spawn this as a background task with `tokio::spawn(store.run())`
///
/// # Arguments
/// * `buffer_size` - Size of the channel buffer (writers wait if full)
pub fn create_status_system(buffer_size: usize) -> (StatusHandle, StatusStore) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = StatusHandle::new(tx);
    let store = StatusStore::new(rx);
    (handle, store)
}
