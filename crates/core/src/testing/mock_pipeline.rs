//! Mock processing pipeline for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::TrackMeta;
use crate::remote::{ProcessingPipeline, ProcessingStatus, RemoteError, RemoteState};

/// A recorded hand-off for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub meta: TrackMeta,
    pub payload: Vec<u8>,
}

/// Mock implementation of the ProcessingPipeline trait.
///
/// Unless scripted, every submitted track reports `complete` on its first
/// poll with artifact url `mock://artifacts/<id>` and file name `<id>.mp3`.
/// A script is a sequence of reports returned one per poll; the last one
/// repeats forever.
#[derive(Debug, Default)]
pub struct MockPipeline {
    submissions: Arc<RwLock<Vec<RecordedSubmission>>>,
    scripts: Arc<RwLock<HashMap<String, VecDeque<ProcessingStatus>>>>,
    status_calls: Arc<RwLock<HashMap<String, usize>>>,
    submit_failures: Arc<RwLock<u32>>,
    failing_status: Arc<RwLock<HashSet<String>>>,
    failing_artifacts: Arc<RwLock<HashSet<String>>>,
}

impl MockPipeline {
    /// Create a new mock pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reports returned for `id`.
    pub async fn set_status_sequence(&self, id: &str, sequence: Vec<ProcessingStatus>) {
        self.scripts
            .write()
            .await
            .insert(id.to_string(), sequence.into());
    }

    /// Report `processing` for `polls` polls, then complete.
    pub async fn complete_after(&self, id: &str, polls: usize) {
        let mut sequence = vec![ProcessingStatus::new(id, RemoteState::Processing); polls];
        sequence.push(Self::default_complete(id));
        self.set_status_sequence(id, sequence).await;
    }

    /// Report `processing` forever for `id`.
    pub async fn never_complete(&self, id: &str) {
        self.set_status_sequence(id, vec![ProcessingStatus::new(id, RemoteState::Processing)])
            .await;
    }

    /// Fail the next `times` submissions, whatever the track.
    pub async fn fail_submits(&self, times: u32) {
        *self.submit_failures.write().await = times;
    }

    /// Fail every status query for `id`.
    pub async fn fail_status(&self, id: &str) {
        self.failing_status.write().await.insert(id.to_string());
    }

    /// Fail every download of `url`.
    pub async fn fail_artifact(&self, url: &str) {
        self.failing_artifacts.write().await.insert(url.to_string());
    }

    /// Get all recorded submissions.
    pub async fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.read().await.clone()
    }

    /// Number of status queries made for `id`.
    pub async fn status_calls(&self, id: &str) -> usize {
        self.status_calls
            .read()
            .await
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    /// Report used for tracks without a script.
    pub fn default_complete(id: &str) -> ProcessingStatus {
        ProcessingStatus::complete(id, artifact_url(id), format!("{}.mp3", id))
    }
}

/// Artifact url reported for `id` by default.
pub fn artifact_url(id: &str) -> String {
    format!("mock://artifacts/{}", id)
}

fn api_error(message: &str) -> RemoteError {
    RemoteError::Api {
        status: 503,
        message: message.to_string(),
    }
}

#[async_trait]
impl ProcessingPipeline for MockPipeline {
    async fn submit(&self, meta: &TrackMeta, payload: &[u8]) -> Result<(), RemoteError> {
        {
            let mut failures = self.submit_failures.write().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(api_error("mock submit failure"));
            }
        }

        self.submissions.write().await.push(RecordedSubmission {
            meta: meta.clone(),
            payload: payload.to_vec(),
        });
        Ok(())
    }

    async fn status(&self, id: &str) -> Result<ProcessingStatus, RemoteError> {
        *self
            .status_calls
            .write()
            .await
            .entry(id.to_string())
            .or_default() += 1;

        if self.failing_status.read().await.contains(id) {
            return Err(api_error("mock status failure"));
        }

        let mut scripts = self.scripts.write().await;
        match scripts.get_mut(id) {
            Some(sequence) if sequence.len() > 1 => {
                Ok(sequence.pop_front().unwrap_or_else(|| Self::default_complete(id)))
            }
            Some(sequence) => Ok(sequence
                .front()
                .cloned()
                .unwrap_or_else(|| Self::default_complete(id))),
            None => Ok(Self::default_complete(id)),
        }
    }

    async fn fetch_artifact(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        if self.failing_artifacts.read().await.contains(url) {
            return Err(api_error("mock artifact failure"));
        }
        Ok(format!("artifact:{}", url).into_bytes())
    }
}
