use serde::{Deserialize, Serialize};

/// Processing state reported by the external pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteState {
    Queued,
    Complete,
    Failed,
    /// Also covers any state string this client does not know.
    #[serde(other)]
    Processing,
}

/// One status report for a submitted track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStatus {
    #[serde(default)]
    pub id: String,
    pub status: RemoteState,
    /// Where the finished artifact can be downloaded.
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl ProcessingStatus {
    pub fn new(id: impl Into<String>, status: RemoteState) -> Self {
        Self {
            id: id.into(),
            status,
            file_url: None,
            file_name: None,
        }
    }

    pub fn complete(
        id: impl Into<String>,
        file_url: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            status: RemoteState::Complete,
            file_url: Some(file_url.into()),
            file_name: Some(file_name.into()),
        }
    }

    /// Extension of the remote file name, if it has one.
    pub fn file_extension(&self) -> Option<&str> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || ext.contains(['/', '\\']) {
            None
        } else {
            Some(ext)
        }
    }
}

/// Response of the upload signer.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SignedUpload {
    pub url: String,
}
