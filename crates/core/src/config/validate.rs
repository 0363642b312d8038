use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Pipeline URL present (required by serde, non-empty here)
/// - Server port is not 0
/// - Pools, queues and track id length are non-zero
/// - Retry policy makes at least one attempt
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.pipeline.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "pipeline.base_url cannot be empty".to_string(),
        ));
    }

    let downloader = &config.downloader;
    for (name, value) in [
        ("downloader.track_id_len", downloader.track_id_len),
        ("downloader.queue_capacity", downloader.queue_capacity),
        ("downloader.download_concurrency", downloader.download_concurrency),
        ("downloader.save_concurrency", downloader.save_concurrency),
        ("downloader.status_buffer", downloader.status_buffer),
    ] {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
        }
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry.max_attempts must be at least 1".to_string(),
        ));
    }

    if config.retry.backoff_multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "retry.backoff_multiplier must be >= 1.0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn base_config() -> Config {
        load_config_from_str(
            r#"
[pipeline]
base_url = "https://pipeline.example.com"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = base_config();
        config.downloader.download_concurrency = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("download_concurrency"));
    }

    #[test]
    fn test_validate_empty_pipeline_url_fails() {
        let mut config = base_config();
        config.pipeline.base_url = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_attempts_fails() {
        let mut config = base_config();
        config.retry.max_attempts = 0;
        assert!(validate_config(&config).is_err());
    }
}
