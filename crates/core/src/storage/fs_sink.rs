use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{ArtifactSink, SinkError};

/// Stores artifacts as files in a directory.
///
/// Each artifact is written to `<name>.part` first and renamed into place,
/// so readers never observe a partially written file.
pub struct FsArtifactSink {
    dir: PathBuf,
}

impl FsArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[async_trait]
impl ArtifactSink for FsArtifactSink {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError> {
        if !is_plain_file_name(name) {
            return Err(SinkError::InvalidName {
                name: name.to_string(),
            });
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SinkError::DirectoryCreationFailed {
                path: self.dir.clone(),
                source,
            })?;

        let destination = self.dir.join(name);
        let partial = self.dir.join(format!("{}.part", name));

        if let Err(source) = fs::write(&partial, bytes).await {
            let _ = fs::remove_file(&partial).await;
            return Err(SinkError::WriteFailed {
                path: partial,
                source,
            });
        }

        fs::rename(&partial, &destination)
            .await
            .map_err(|source| SinkError::WriteFailed {
                path: destination.clone(),
                source,
            })?;

        tracing::debug!("Saved {} bytes to {}", bytes.len(), destination.display());
        Ok(destination)
    }
}
