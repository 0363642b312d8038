//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the trackforge server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Downloader queue and pool status (collected dynamically)
//! - Core job metrics, registered from `trackforge_core::metrics`

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trackforge_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trackforge_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trackforge_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Downloader Metrics (collected dynamically)
// =============================================================================

/// Dispatcher running state (1 = running, 0 = stopped).
pub static DOWNLOADER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trackforge_downloader_running",
        "Whether the dispatcher accepts work (1) or is stopped (0)",
    )
    .unwrap()
});

/// Ids waiting in the work queue.
pub static QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("trackforge_queue_depth", "Ids waiting in the work queue").unwrap()
});

/// Jobs waiting for a ticket, by pool.
pub static POOL_QUEUED: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("trackforge_pool_queued", "Jobs waiting for a ticket"),
        &["pool"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Downloader
    registry
        .register(Box::new(DOWNLOADER_RUNNING.clone()))
        .unwrap();
    registry.register(Box::new(QUEUE_DEPTH.clone())).unwrap();
    registry.register(Box::new(POOL_QUEUED.clone())).unwrap();

    // Core metrics (intake, status store, retries, polling)
    for metric in trackforge_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh gauges from the current downloader status before encoding.
pub fn collect_dynamic_metrics(state: &AppState) {
    let status = state.service().pool_status();
    DOWNLOADER_RUNNING.set(i64::from(status.running));
    QUEUE_DEPTH.set(status.queue_depth as i64);
    for pool in [&status.download_pool, &status.save_pool] {
        POOL_QUEUED
            .with_label_values(&[pool.name.as_str()])
            .set(pool.queued_jobs as i64);
    }
}
