//! Common test utilities for in-process API testing with mocks.
//!
//! This module provides a test fixture that builds the router around a real
//! download service whose collaborators are mocks, enabling end to end
//! request tests without a fetch program or remote services.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use trackforge_core::{
    create_status_system,
    downloader::{PlaylistPolicy, ProcessingPolicy},
    load_config_from_str,
    testing::{MockArtifactSink, MockCatalog, MockFetcher, MockPipeline},
    ArtifactSink, Collaborators, DownloadService, DownloaderOptions, MediaCatalog, MediaFetcher,
    ProcessingPipeline, RetryPolicy,
};
use trackforge_server::state::AppState;

/// Re-export fixtures for test convenience
pub use trackforge_core::testing::fixtures;

const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 0

[pipeline]
base_url = "http://pipeline.test"
"#;

/// Test fixture for API testing with mock collaborators.
///
/// Provides an in-process router with fully controllable mocks for:
/// - Media fetching (MockFetcher)
/// - Remote processing (MockPipeline)
/// - Playlist and metadata lookup (MockCatalog)
/// - Artifact storage (MockArtifactSink)
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The service behind the router
    pub service: DownloadService,
    pub fetcher: Arc<MockFetcher>,
    pub pipeline: Arc<MockPipeline>,
    pub catalog: Arc<MockCatalog>,
    pub sink: Arc<MockArtifactSink>,
    /// Temporary directory for fetched media
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = load_config_from_str(TEST_CONFIG).expect("Failed to parse test config");

        let fetcher = Arc::new(MockFetcher::new(temp_dir.path()));
        let pipeline = Arc::new(MockPipeline::new());
        let catalog = Arc::new(MockCatalog::new());
        let sink = Arc::new(MockArtifactSink::new());

        let (status, store) = create_status_system(256);
        tokio::spawn(store.run());

        let options = DownloaderOptions {
            retry: RetryPolicy::immediate(2),
            processing: ProcessingPolicy {
                poll_interval: Duration::from_millis(10),
                timeout: Duration::from_secs(5),
            },
            playlist: PlaylistPolicy {
                warning_threshold: 10,
                ack_poll_interval: Duration::from_millis(10),
                ack_timeout: Duration::from_secs(5),
                aggregation_poll_interval: Duration::from_millis(10),
                aggregation_timeout: Duration::from_secs(10),
            },
            ..DownloaderOptions::from_config(&config)
        };

        let (service, dispatcher) = DownloadService::new(
            options,
            Collaborators {
                fetcher: Arc::clone(&fetcher) as Arc<dyn MediaFetcher>,
                pipeline: Arc::clone(&pipeline) as Arc<dyn ProcessingPipeline>,
                catalog: Arc::clone(&catalog) as Arc<dyn MediaCatalog>,
                sink: Arc::clone(&sink) as Arc<dyn ArtifactSink>,
            },
            status,
        );
        tokio::spawn(dispatcher.run());

        let state = Arc::new(AppState::new(config, service.clone()));
        let router = trackforge_server::api::create_router(state);

        Self {
            router,
            service,
            fetcher,
            pipeline,
            catalog,
            sink,
            temp_dir,
        }
    }

    /// Send a GET request to the test router.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    /// Poll `/status` until `id` reports `status`.
    pub async fn wait_for_status(&self, id: &str, status: &str) -> TestResponse {
        let path = format!("/api/v1/status?id={}", id);
        for _ in 0..500 {
            let response = self.get(&path).await;
            if response.body["status"] == status {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{} never reached {}", id, status);
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
