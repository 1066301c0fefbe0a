//! Types for catalog Web API requests and responses.
//!
//! Only the fields the client consumes are modelled; everything else in the
//! vendor JSON is ignored.

use serde::{Deserialize, Serialize};
use tunen_core::types::{CatalogPlaylist, CatalogUser, TrackId, TrackRef};

/// Default Web API base
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Default accounts (authorization) service base
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Configuration for connecting to the catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Web API base URL (e.g., "https://api.spotify.com/v1")
    pub api_base: String,
    /// Accounts service base URL, used for token requests
    pub accounts_base: String,
}

impl CatalogConfig {
    /// Config pointing both services at `api_base` (useful for mock servers)
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        Self {
            accounts_base: api_base.clone(),
            api_base,
        }
    }

    /// Set the accounts service base URL
    #[must_use]
    pub fn with_accounts_base(mut self, accounts_base: impl Into<String>) -> Self {
        self.accounts_base = accounts_base.into();
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
        }
    }
}

// =============================================================================
// Track Types
// =============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiImage {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiAlbum {
    #[serde(default)]
    pub images: Vec<ApiImage>,
}

/// A track as returned by the catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
    pub album: Option<ApiAlbum>,
    pub preview_url: Option<String>,
}

impl From<ApiTrack> for TrackRef {
    fn from(track: ApiTrack) -> Self {
        TrackRef {
            id: TrackId::new(track.id),
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            preview_url: track.preview_url,
            artwork_url: track
                .album
                .and_then(|album| album.images.into_iter().next())
                .map(|image| image.url),
        }
    }
}

/// Paged collection wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub total: Option<u32>,
    pub next: Option<String>,
}

/// Response of `GET /search`.
///
/// Playlist search may contain `null` entries for unavailable playlists.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<Paging<ApiTrack>>,
    pub playlists: Option<Paging<Option<ApiPlaylist>>>,
}

/// Entry of `GET /me/player/recently-played`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecentlyPlayedItem {
    pub track: ApiTrack,
    pub played_at: String,
}

// =============================================================================
// Playlist Types
// =============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiTrackTotal {
    pub total: u32,
}

/// A playlist as returned by the catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiPlaylist {
    pub id: String,
    pub name: String,
    pub images: Option<Vec<ApiImage>>,
    pub tracks: Option<ApiTrackTotal>,
}

impl From<ApiPlaylist> for CatalogPlaylist {
    fn from(playlist: ApiPlaylist) -> Self {
        CatalogPlaylist {
            id: playlist.id,
            name: playlist.name,
            image_url: playlist
                .images
                .and_then(|images| images.into_iter().next())
                .map(|image| image.url),
            track_total: playlist.tracks.map(|t| t.total),
        }
    }
}

/// Request body for playlist creation.
#[derive(Debug, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

/// Request body for appending tracks.
#[derive(Debug, Serialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

/// Response from playlist mutations.
#[derive(Debug, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

// =============================================================================
// User Types
// =============================================================================

/// Current account profile (`GET /me`).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub images: Vec<ApiImage>,
}

impl From<ApiUser> for CatalogUser {
    fn from(user: ApiUser) -> Self {
        CatalogUser {
            id: user.id,
            display_name: user.display_name,
            email: user.email,
            image_url: user.images.into_iter().next().map(|image| image.url),
        }
    }
}

// =============================================================================
// Token Types
// =============================================================================

/// Response from the accounts token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Token validity in seconds
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

// =============================================================================
// Error Types
// =============================================================================

/// Error body of the Web API: `{"error": {"status": 401, "message": "..."}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub status: u16,
    pub message: String,
}
