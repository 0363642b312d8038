use trackforge_core::{Config, DownloadService, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    service: DownloadService,
}

impl AppState {
    pub fn new(config: Config, service: DownloadService) -> Self {
        Self { config, service }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn service(&self) -> &DownloadService {
        &self.service
    }
}
