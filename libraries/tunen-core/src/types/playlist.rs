//! Playlist domain types

use super::ids::{PlaylistId, TrackId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Playlist as held by the view-model
///
/// `has_voted` is the current viewer's flag, not a property of the stored
/// document. Values are replaced wholesale on change, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Ordered track references
    pub tracks: Vec<TrackId>,

    /// Optional cover image reference
    pub image: Option<String>,

    /// Owner identity
    pub owner: UserId,

    /// Upvote count
    pub upvotes: u32,

    /// Downvote count
    pub downvotes: u32,

    /// Whether the current viewer has voted
    pub has_voted: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create an empty, unvoted playlist
    pub fn new(id: PlaylistId, name: impl Into<String>, owner: UserId) -> Self {
        Self {
            id,
            name: name.into(),
            tracks: Vec::new(),
            image: None,
            owner,
            upvotes: 0,
            downvotes: 0,
            has_voted: false,
            created_at: Utc::now(),
        }
    }

    /// Build a playlist from a stored document and the viewer's vote flag
    pub fn from_stored(stored: StoredPlaylist, has_voted: bool) -> Self {
        let StoredPlaylist { id, record } = stored;
        Self {
            id,
            name: record.name,
            tracks: record.songs.into_iter().map(TrackId::new).collect(),
            image: record.image,
            owner: UserId::new(record.username),
            upvotes: record.upvotes,
            downvotes: record.downvotes,
            has_voted,
            created_at: record.created_at,
        }
    }

    /// Number of tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// Data for creating a new playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub name: String,
    pub tracks: Vec<TrackId>,
    pub image: Option<String>,
    pub owner: UserId,
}

impl NewPlaylist {
    /// Document written to the store for this playlist
    pub fn to_record(&self, created_at: DateTime<Utc>) -> PlaylistRecord {
        PlaylistRecord {
            name: self.name.clone(),
            songs: self.tracks.iter().map(|t| t.as_str().to_string()).collect(),
            created_at,
            image: self.image.clone(),
            username: self.owner.as_str().to_string(),
            upvotes: 0,
            downvotes: 0,
        }
    }
}

/// Document shape in the `playlists` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub name: String,

    #[serde(default)]
    pub songs: Vec<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub image: Option<String>,

    /// Owner identity; the collection is queried by equality on this field
    pub username: String,

    #[serde(default)]
    pub upvotes: u32,

    #[serde(default)]
    pub downvotes: u32,
}

impl PlaylistRecord {
    /// Apply a partial update in place
    pub fn apply(&mut self, patch: &PlaylistPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(songs) = &patch.songs {
            self.songs.clone_from(songs);
        }
        if let Some(image) = &patch.image {
            self.image = Some(image.clone());
        }
        if let Some(upvotes) = patch.upvotes {
            self.upvotes = upvotes;
        }
        if let Some(downvotes) = patch.downvotes {
            self.downvotes = downvotes;
        }
    }
}

/// A playlist document together with its store-assigned id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPlaylist {
    pub id: PlaylistId,
    #[serde(flatten)]
    pub record: PlaylistRecord,
}

/// Partial update for a playlist document
///
/// Unset fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upvotes: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub downvotes: Option<u32>,
}

impl PlaylistPatch {
    /// Patch replacing the song list
    pub fn songs(tracks: &[TrackId]) -> Self {
        Self {
            songs: Some(tracks.iter().map(|t| t.as_str().to_string()).collect()),
            ..Self::default()
        }
    }

    /// Patch carrying both vote counters of `playlist`
    pub fn votes(playlist: &Playlist) -> Self {
        Self {
            upvotes: Some(playlist.upvotes),
            downvotes: Some(playlist.downvotes),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
