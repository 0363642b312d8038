pub mod catalog;
pub mod config;
pub mod downloader;
pub mod fetcher;
pub mod metrics;
pub mod remote;
pub mod retry;
pub mod status;
pub mod storage;
pub mod testing;

pub use catalog::{CatalogConfig, CatalogError, HttpMediaCatalog, MediaCatalog, TrackMeta};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use downloader::{
    Collaborators, Dispatcher, DownloadService, DownloaderError, DownloaderOptions,
    DownloaderStatus, PoolStatus,
};
pub use fetcher::{FetchError, FetcherConfig, MediaFetcher, ProcessFetcher};
pub use remote::{
    HttpPipelineClient, PipelineConfig, ProcessingPipeline, ProcessingStatus, RemoteError,
    RemoteState,
};
pub use retry::{RetryConfig, RetryPolicy};
pub use status::{
    create_status_system, JobKind, JobStatus, StatusError, StatusHandle, StatusRecord, StatusStore,
};
pub use storage::{ArtifactSink, FsArtifactSink, SinkError};
