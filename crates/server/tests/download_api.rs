//! API tests for the download endpoints.
//!
//! These drive the router in-process against a real download service with
//! mock collaborators.

mod common;

use axum::http::StatusCode;
use common::{fixtures, TestFixture};
use trackforge_core::downloader::size_warning;

// =============================================================================
// Basic endpoints
// =============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["pipeline_configured"], true);
    assert_eq!(response.body["downloader"]["track_id_len"], 11);
    assert!(response.body["downloader"].get("save_dir").is_none());
    assert!(response.body.get("fetcher").is_none());
}

#[tokio::test]
async fn test_metrics_exposition() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/api/v1/metrics").await;
    assert_status!(response, StatusCode::OK);

    let text = response.body.as_str().expect("metrics should be plain text");
    assert!(text.contains("trackforge_http_requests_total"));
    assert!(text.contains("trackforge_queue_depth"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/nope").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

// =============================================================================
// Download lifecycle
// =============================================================================

#[tokio::test]
async fn test_download_requires_id() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/download").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().unwrap().contains("id"));

    let response = fixture.get("/api/v1/download?id=").await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture.get("/api/v1/status").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_of_unknown_id_is_queued() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/status?id=never-seen").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["id"], "never-seen");
    assert_eq!(response.body["status"], "queued");
}

#[tokio::test]
async fn test_track_download_completes() {
    let fixture = TestFixture::new().await;
    let id = fixtures::track_id(1);
    fixture
        .catalog
        .set_meta(fixtures::track_meta(&id, "Song", "Band"))
        .await;

    let response = fixture.get(&format!("/api/v1/download?id={}", id)).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["state"], "ACK");

    let response = fixture.wait_for_status(&id, "complete").await;
    assert_eq!(response.body["file_name"], "Band - Song.mp3");
    assert_eq!(response.body["title"], "Song");
    assert_eq!(response.body["artist"], "Band");

    assert_eq!(fixture.sink.saved_names().await, vec!["Band - Song.mp3"]);
}

#[tokio::test]
async fn test_failed_track_reports_reason() {
    let fixture = TestFixture::new().await;
    let id = fixtures::track_id(2);
    fixture.fetcher.fail_always(&id).await;

    fixture.get(&format!("/api/v1/download?id={}", id)).await;

    let response = fixture.wait_for_status(&id, "failed").await;
    assert!(response.body["warning"]
        .as_str()
        .unwrap()
        .contains("media fetch failed"));
}

#[tokio::test]
async fn test_downloader_status() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/downloader/status").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["running"], true);
    assert_eq!(response.body["queue_capacity"], 5000);
    assert_eq!(response.body["download_pool"]["name"], "download");
    assert_eq!(response.body["download_pool"]["max_concurrent"], 4);
    assert_eq!(response.body["save_pool"]["name"], "save");
}

#[tokio::test]
async fn test_download_after_stop_is_unavailable() {
    let fixture = TestFixture::new().await;
    fixture.service.stop();

    let response = fixture
        .get(&format!("/api/v1/download?id={}", fixtures::track_id(1)))
        .await;
    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Playlist acknowledgement
// =============================================================================

#[tokio::test]
async fn test_large_playlist_acknowledge_flow() {
    let fixture = TestFixture::new().await;
    let playlist = fixtures::playlist_id(7);
    fixture
        .catalog
        .set_playlist(&playlist, fixtures::track_ids(100, 12))
        .await;

    let response = fixture
        .get(&format!("/api/v1/download?id={}", playlist))
        .await;
    assert_status!(response, StatusCode::OK);

    let response = fixture.wait_for_status(&playlist, "warning").await;
    assert_eq!(response.body["warning"], size_warning(12));
    assert_eq!(response.body["playlist_total"], 12);

    let response = fixture
        .get(&format!("/api/v1/acknowledge?id={}", playlist))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["state"], "ACK");

    let response = fixture.wait_for_status(&playlist, "complete").await;
    assert_eq!(response.body["playlist_total"], 12);
    assert_eq!(response.body["playlist_done"], 12);
    assert_eq!(fixture.sink.saves().await.len(), 12);
}

#[tokio::test]
async fn test_large_playlist_decline_flow() {
    let fixture = TestFixture::new().await;
    let playlist = fixtures::playlist_id(8);
    fixture
        .catalog
        .set_playlist(&playlist, fixtures::track_ids(200, 11))
        .await;

    fixture
        .get(&format!("/api/v1/download?id={}", playlist))
        .await;
    fixture.wait_for_status(&playlist, "warning").await;

    let response = fixture
        .get(&format!("/api/v1/decline?id={}", playlist))
        .await;
    assert_status!(response, StatusCode::OK);

    let response = fixture.wait_for_status(&playlist, "failed").await;
    assert!(!response.body["warning"].as_str().unwrap().is_empty());

    // A second decision has nothing to resolve
    let response = fixture
        .get(&format!("/api/v1/acknowledge?id={}", playlist))
        .await;
    assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_acknowledge_without_warning_conflicts() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/acknowledge?id=PLnothing").await;
    assert_status!(response, StatusCode::CONFLICT);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("not awaiting acknowledgement"));

    let response = fixture.get("/api/v1/decline?id=PLnothing").await;
    assert_status!(response, StatusCode::CONFLICT);

    let response = fixture.get("/api/v1/acknowledge").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}
