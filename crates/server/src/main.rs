use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackforge_core::{
    create_status_system, load_config, validate_config, ArtifactSink, Collaborators,
    DownloadService, DownloaderOptions, FsArtifactSink, HttpMediaCatalog, HttpPipelineClient,
    MediaCatalog, MediaFetcher, ProcessFetcher, ProcessingPipeline,
};
use trackforge_server::api::create_router;
use trackforge_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("TRACKFORGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Pipeline: {}", config.pipeline.base_url);
    info!("Artifacts saved to {:?}", config.downloader.save_dir);

    // Create status system
    let (status, store) = create_status_system(config.downloader.status_buffer);
    tokio::spawn(store.run());

    // Collaborators
    let fetcher: Arc<dyn MediaFetcher> = Arc::new(ProcessFetcher::new(config.fetcher.clone()));
    info!("Using fetch program {:?}", config.fetcher.program);

    let pipeline: Arc<dyn ProcessingPipeline> = Arc::new(
        HttpPipelineClient::new(&config.pipeline).context("Failed to create pipeline client")?,
    );

    let catalog_config = config.catalog_or_default();
    let catalog: Arc<dyn MediaCatalog> = Arc::new(
        HttpMediaCatalog::new(&catalog_config).context("Failed to create catalog client")?,
    );
    info!("Catalog: {}", catalog_config.base_url);

    let sink: Arc<dyn ArtifactSink> =
        Arc::new(FsArtifactSink::new(config.downloader.save_dir.clone()));

    // Create download service and start dispatcher
    let (service, dispatcher) = DownloadService::new(
        DownloaderOptions::from_config(&config),
        Collaborators {
            fetcher,
            pipeline,
            catalog,
            sink,
        },
        status,
    );
    let dispatcher_handle = tokio::spawn(dispatcher.run());
    info!(
        "Download service started ({} download / {} save tickets)",
        config.downloader.download_concurrency, config.downloader.save_concurrency
    );

    // Create app state and router
    let state = Arc::new(AppState::new(config.clone(), service.clone()));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    service.stop();
    let _ = dispatcher_handle.await;
    info!("Dispatcher stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
