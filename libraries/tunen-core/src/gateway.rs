//! Gateway traits
//!
//! Boundaries to the external services. Implementations live in
//! `tunen-catalog` (music catalog) and `tunen-docstore` (document stores and
//! vote ledgers); the view-model only sees these traits.

use crate::error::Result;
use crate::session::Session;
use crate::types::{
    CatalogPlaylist, PlaylistId, PlaylistPatch, PlaylistRecord, SearchKind, SearchResults,
    StoredPlaylist, TrackId, TrackRef, UserId, UserProfile, VoteType,
};
use async_trait::async_trait;

/// Music catalog gateway
///
/// Every call is a single request/response with no retry. Non-success
/// responses surface as `TuneError::RemoteService`. The session supplies the
/// bearer credential; gateways never refresh it.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Search the catalog
    async fn search(
        &self,
        session: &Session,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<SearchResults>;

    /// Playlists of the authenticated account
    async fn list_owner_playlists(&self, session: &Session) -> Result<Vec<CatalogPlaylist>>;

    /// Create an empty playlist on the authenticated account
    async fn create_playlist(&self, session: &Session, name: &str) -> Result<CatalogPlaylist>;

    /// Append track URIs to a catalog playlist
    async fn append_tracks(&self, session: &Session, playlist_id: &str, uris: &[String])
        -> Result<()>;

    /// Fetch a single track
    async fn get_track(&self, session: &Session, id: &TrackId) -> Result<TrackRef>;
}

/// Document store gateway for the `playlists` and `users` collections
///
/// Failures surface as `TuneError::StorageService`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All playlists whose `username` equals `owner`
    async fn query_by_owner(&self, owner: &UserId) -> Result<Vec<StoredPlaylist>>;

    /// Insert a document, returning its new id
    async fn insert(&self, record: PlaylistRecord) -> Result<PlaylistId>;

    /// Apply a partial update
    async fn update(&self, id: &PlaylistId, patch: PlaylistPatch) -> Result<()>;

    /// Delete a document; deleting a missing document is not an error
    async fn delete(&self, id: &PlaylistId) -> Result<()>;

    /// Profile document for `email`
    async fn find_user(&self, email: &str) -> Result<Option<UserProfile>>;
}

/// Record of who voted on what
///
/// The implementation decides the scope of "one vote": a session ledger
/// forgets on restart, a durable ledger does not.
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Whether `viewer` already voted on `playlist`
    async fn has_voted(&self, viewer: &UserId, playlist: &PlaylistId) -> Result<bool>;

    /// Record a vote; returns `false` when `viewer` had already voted, in
    /// which case the first vote is kept.
    async fn record(&self, viewer: &UserId, playlist: &PlaylistId, vote: VoteType)
        -> Result<bool>;

    /// Withdraw a recorded vote whose counter write did not happen
    async fn retract(&self, viewer: &UserId, playlist: &PlaylistId) -> Result<()>;
}
