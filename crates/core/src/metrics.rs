//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Intake (jobs initiated by kind)
//! - Status store (jobs reaching a terminal status)
//! - Retry policy and remote polling

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, IntGaugeVec, Opts};

// =============================================================================
// Intake Metrics
// =============================================================================

/// Jobs accepted by intake, by kind.
pub static JOBS_INITIATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trackforge_jobs_initiated_total", "Total jobs accepted by intake"),
        &["kind"], // "track", "playlist"
    )
    .unwrap()
});

/// Jobs reaching a terminal status.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trackforge_jobs_finished_total",
            "Total jobs that reached a terminal status",
        ),
        &["status"], // "complete", "failed"
    )
    .unwrap()
});

/// Tickets currently held, by pool.
pub static TICKETS_IN_USE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("trackforge_tickets_in_use", "Concurrency tickets currently held"),
        &["pool"], // "download", "save"
    )
    .unwrap()
});

// =============================================================================
// External Call Metrics
// =============================================================================

/// Retry attempts by operation.
pub static RETRY_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trackforge_retry_attempts_total", "Total retried attempts"),
        &["operation"],
    )
    .unwrap()
});

/// Remote status polls issued.
pub static PROCESSING_POLLS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trackforge_processing_polls_total",
        "Total remote processing status polls",
    )
    .unwrap()
});

/// Processing pollers that hit their deadline.
pub static PROCESSING_TIMEOUTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trackforge_processing_timeouts_total",
        "Total processing pollers that timed out",
    )
    .unwrap()
});

/// Status writes rejected because the job was already terminal.
pub static REJECTED_STATUS_WRITES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trackforge_rejected_status_writes_total",
        "Status writes rejected for terminal jobs",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_INITIATED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(TICKETS_IN_USE.clone()),
        Box::new(RETRY_ATTEMPTS.clone()),
        Box::new(PROCESSING_POLLS.clone()),
        Box::new(PROCESSING_TIMEOUTS.clone()),
        Box::new(REJECTED_STATUS_WRITES.clone()),
    ]
}
