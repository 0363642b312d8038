use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{downloads, handlers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Downloads
        .route("/download", get(downloads::initiate_download))
        .route("/status", get(downloads::get_status))
        .route("/acknowledge", get(downloads::acknowledge_warning))
        .route("/decline", get(downloads::decline_warning))
        .route("/downloader/status", get(downloads::downloader_status))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    // Browser extension clients call from arbitrary origins
    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
