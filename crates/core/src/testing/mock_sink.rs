//! Mock artifact sink for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{ArtifactSink, SinkError};

/// A recorded save for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSave {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Mock implementation of the ArtifactSink trait, keeping artifacts in memory.
#[derive(Debug, Default)]
pub struct MockArtifactSink {
    saves: Arc<RwLock<Vec<RecordedSave>>>,
    failures: Arc<RwLock<u32>>,
}

impl MockArtifactSink {
    /// Create a new mock sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` saves.
    pub async fn fail_times(&self, times: u32) {
        *self.failures.write().await = times;
    }

    /// Get all recorded saves.
    pub async fn saves(&self) -> Vec<RecordedSave> {
        self.saves.read().await.clone()
    }

    /// Names of saved artifacts, in save order.
    pub async fn saved_names(&self) -> Vec<String> {
        self.saves
            .read()
            .await
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }
}

#[async_trait]
impl ArtifactSink for MockArtifactSink {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError> {
        {
            let mut failures = self.failures.write().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(SinkError::WriteFailed {
                    path: PathBuf::from(name),
                    source: std::io::Error::other("mock sink failure"),
                });
            }
        }

        self.saves.write().await.push(RecordedSave {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(PathBuf::from("/mock/artifacts").join(name))
    }
}
