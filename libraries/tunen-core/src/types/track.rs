/// Catalog-facing domain types
use super::ids::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Track reference, immutable once fetched from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub id: TrackId,
    pub name: String,
    /// Artist display names in catalog order
    pub artists: Vec<String>,
    /// 30-second preview audio, when the catalog offers one
    pub preview_url: Option<String>,
    /// First (largest) album artwork image
    pub artwork_url: Option<String>,
}

impl TrackRef {
    /// Artists joined for display ("A, B")
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.artists.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} by {}", self.name, self.artist_line())
        }
    }
}

/// Playlist owned by the catalog account (not a document-store playlist)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPlaylist {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub track_total: Option<u32>,
}

/// Catalog account profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

/// What a catalog search looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Track,
    Playlist,
}

impl SearchKind {
    /// Value of the `type` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Track => "track",
            SearchKind::Playlist => "playlist",
        }
    }

    /// Parse from the query parameter value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "track" => Some(SearchKind::Track),
            "playlist" => Some(SearchKind::Playlist),
            _ => None,
        }
    }
}

/// Search results; only the section for the requested kind is populated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub tracks: Vec<TrackRef>,
    pub playlists: Vec<CatalogPlaylist>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.playlists.is_empty()
    }
}
