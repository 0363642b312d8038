use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::{FetchError, FetcherConfig, MediaFetcher};

/// Env var carrying the temp directory to the fetch program.
pub const TEMP_DIR_ENV: &str = "TRACKFORGE_TEMP_DIR";

/// Fetcher that runs an external program per track.
pub struct ProcessFetcher {
    config: FetcherConfig,
}

impl ProcessFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Where the program is expected to leave the media of `id`.
    pub fn output_path(&self, id: &str) -> PathBuf {
        self.config.temp_dir.join(id)
    }
}

fn is_safe_file_name(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}

#[async_trait]
impl MediaFetcher for ProcessFetcher {
    async fn fetch(&self, id: &str) -> Result<PathBuf, FetchError> {
        if !is_safe_file_name(id) {
            return Err(FetchError::InvalidId { id: id.to_string() });
        }

        tokio::fs::create_dir_all(&self.config.temp_dir).await?;

        tracing::debug!(
            "Running {} for track {}",
            self.config.program.display(),
            id
        );

        let child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(format!("-id={}", id))
            .env(TEMP_DIR_ENV, &self.config.temp_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::ProgramNotFound {
                        path: self.config.program.clone(),
                    }
                } else {
                    FetchError::Io(e)
                }
            })?;

        // Dropping the child on timeout kills it
        let output = match timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(FetchError::Failed {
                id: id.to_string(),
                code: output.status.code(),
                stderr: if stderr.is_empty() { None } else { Some(stderr) },
            });
        }

        let path = self.output_path(id);
        if !tokio::fs::try_exists(&path).await? {
            return Err(FetchError::MissingOutput { path });
        }

        Ok(path)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sh_fetcher(temp: &TempDir, script: &str, timeout_secs: u64) -> ProcessFetcher {
        ProcessFetcher::new(FetcherConfig {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string(), "fetch".to_string()],
            temp_dir: temp.path().to_path_buf(),
            timeout_secs,
        })
    }

    #[tokio::test]
    async fn test_fetch_returns_written_file() {
        let temp = TempDir::new().unwrap();
        let fetcher = sh_fetcher(
            &temp,
            r#"id="${1#-id=}"; printf media > "$TRACKFORGE_TEMP_DIR/$id""#,
            10,
        );

        let path = fetcher.fetch("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(path, temp.path().join("dQw4w9WgXcQ"));
        assert_eq!(std::fs::read(&path).unwrap(), b"media");
    }

    #[tokio::test]
    async fn test_fetch_nonzero_exit() {
        let temp = TempDir::new().unwrap();
        let fetcher = sh_fetcher(&temp, "echo boom >&2; exit 3", 10);

        let err = fetcher.fetch("dQw4w9WgXcQ").await.unwrap_err();
        match err {
            FetchError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.as_deref(), Some("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_output() {
        let temp = TempDir::new().unwrap();
        let fetcher = sh_fetcher(&temp, "exit 0", 10);

        let err = fetcher.fetch("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, FetchError::MissingOutput { .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let temp = TempDir::new().unwrap();
        let fetcher = sh_fetcher(&temp, "sleep 30", 1);

        let err = fetcher.fetch("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { timeout_secs: 1 }));
    }

    #[tokio::test]
    async fn test_program_not_found() {
        let temp = TempDir::new().unwrap();
        let fetcher = ProcessFetcher::new(FetcherConfig {
            program: PathBuf::from("/nonexistent/trackforge-fetch"),
            temp_dir: temp.path().to_path_buf(),
            ..Default::default()
        });

        let err = fetcher.fetch("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, FetchError::ProgramNotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let temp = TempDir::new().unwrap();
        let fetcher = sh_fetcher(&temp, "exit 0", 10);

        for id in ["../escape", "a/b", "..", ""] {
            let err = fetcher.fetch(id).await.unwrap_err();
            assert!(matches!(err, FetchError::InvalidId { .. }), "id {:?}", id);
        }
    }
}
