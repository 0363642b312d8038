//! Types returned by the media catalog.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Characters that cannot appear in an artifact file name.
static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).unwrap());

/// Resolved metadata of a single track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMeta {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_art_url: Option<String>,
}

impl TrackMeta {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            cover_art_url: None,
        }
    }

    /// File name under which the finished artifact is stored.
    ///
    /// `"{artist} - {title}.{ext}"` with path-hostile characters replaced by
    /// `_`. Falls back to the track id when both artist and title are blank.
    pub fn artifact_name(&self, ext: &str) -> String {
        let ext = ext.trim_start_matches('.');
        let artist = self.artist.trim();
        let title = self.title.trim();

        let stem = match (artist.is_empty(), title.is_empty()) {
            (true, true) => self.id.clone(),
            (true, false) => title.to_string(),
            (false, true) => artist.to_string(),
            (false, false) => format!("{} - {}", artist, title),
        };
        let stem = UNSAFE_CHARS.replace_all(&stem, "_");

        if ext.is_empty() {
            stem.into_owned()
        } else {
            format!("{}.{}", stem, ext)
        }
    }
}

/// One member of a playlist listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: String,
}

/// Playlist listing as served by the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistListing {
    #[serde(default)]
    pub tracks: Vec<PlaylistEntry>,
}
