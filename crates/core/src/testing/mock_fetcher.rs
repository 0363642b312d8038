//! Mock media fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fetcher::{FetchError, MediaFetcher};

/// Mock implementation of the MediaFetcher trait.
///
/// Writes `media:<id>` to `<dir>/<id>` like the real fetch program and
/// provides controllable behavior for testing:
/// - Record every fetch call
/// - Fail a given id a number of times (or always)
/// - Simulate slow fetches and measure peak concurrency
#[derive(Debug)]
pub struct MockFetcher {
    dir: PathBuf,
    calls: Arc<RwLock<Vec<String>>>,
    /// Remaining failures per id.
    failures: Arc<RwLock<HashMap<String, u32>>>,
    delay: Arc<RwLock<Duration>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockFetcher {
    /// Create a mock fetcher writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            calls: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the next `times` fetches of `id`.
    pub async fn fail_times(&self, id: &str, times: u32) {
        self.failures.write().await.insert(id.to_string(), times);
    }

    /// Fail every fetch of `id`.
    pub async fn fail_always(&self, id: &str) {
        self.fail_times(id, u32::MAX).await;
    }

    /// Make every fetch take at least `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all recorded fetch calls, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Number of fetches of `id`.
    pub async fn call_count(&self, id: &str) -> usize {
        self.calls.read().await.iter().filter(|c| *c == id).count()
    }

    /// Highest number of fetches that ran at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Path the fetcher writes the media of `id` to.
    pub fn media_path(&self, id: &str) -> PathBuf {
        self.dir.join(id)
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn fetch(&self, id: &str) -> Result<PathBuf, FetchError> {
        self.calls.write().await.push(id.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let should_fail = {
            let mut failures = self.failures.write().await;
            match failures.get_mut(id) {
                Some(0) | None => false,
                Some(remaining) => {
                    if *remaining != u32::MAX {
                        *remaining -= 1;
                    }
                    true
                }
            }
        };

        let result = if should_fail {
            Err(FetchError::Failed {
                id: id.to_string(),
                code: Some(1),
                stderr: Some("mock fetch failure".to_string()),
            })
        } else {
            let path = self.media_path(id);
            match tokio::fs::create_dir_all(&self.dir).await {
                Ok(()) => tokio::fs::write(&path, format!("media:{}", id))
                    .await
                    .map(|_| path)
                    .map_err(FetchError::from),
                Err(e) => Err(FetchError::from(e)),
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
