//! Configuration for the media fetcher.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the external fetch program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Program invoked once per track.
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Arguments placed before the `-id=<id>` argument.
    #[serde(default)]
    pub args: Vec<String>,

    /// Directory the program writes `<temp_dir>/<id>` into.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Timeout for a single fetch in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_program() -> PathBuf {
    PathBuf::from("./downloader")
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("trackforge")
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            temp_dir: default_temp_dir(),
            timeout_secs: default_timeout(),
        }
    }
}
