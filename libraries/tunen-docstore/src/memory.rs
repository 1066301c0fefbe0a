//! In-process store and session-scoped vote ledger.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;
use tunen_core::types::{
    PlaylistId, PlaylistPatch, PlaylistRecord, StoredPlaylist, UserId, UserProfile, VoteType,
};
use tunen_core::{DocumentStore, Result, TuneError, VoteLedger};

/// Document store held entirely in memory, in insertion order.
///
/// Used for offline sessions and as a test double.
#[derive(Default)]
pub struct MemoryDocumentStore {
    playlists: RwLock<Vec<StoredPlaylist>>,
    users: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `playlists`, keeping their ids.
    pub fn with_playlists(playlists: impl IntoIterator<Item = StoredPlaylist>) -> Self {
        Self {
            playlists: RwLock::new(playlists.into_iter().collect()),
            users: RwLock::default(),
        }
    }

    /// Insert or replace a profile document.
    pub async fn upsert_user(&self, profile: UserProfile) {
        self.users.write().await.insert(profile.email.clone(), profile);
    }

    /// Snapshot of a stored document
    pub async fn get(&self, id: &PlaylistId) -> Option<StoredPlaylist> {
        self.playlists
            .read()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    /// Number of stored playlist documents
    pub async fn len(&self) -> usize {
        self.playlists.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.playlists.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn query_by_owner(&self, owner: &UserId) -> Result<Vec<StoredPlaylist>> {
        Ok(self
            .playlists
            .read()
            .await
            .iter()
            .filter(|p| p.record.username == owner.as_str())
            .cloned()
            .collect())
    }

    async fn insert(&self, record: PlaylistRecord) -> Result<PlaylistId> {
        let id = PlaylistId::generate();
        self.playlists.write().await.push(StoredPlaylist {
            id: id.clone(),
            record,
        });
        debug!(playlist_id = %id, "Stored playlist in memory");
        Ok(id)
    }

    async fn update(&self, id: &PlaylistId, patch: PlaylistPatch) -> Result<()> {
        let mut playlists = self.playlists.write().await;
        let stored = playlists
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| TuneError::storage(404, format!("Playlist not found: {}", id)))?;
        stored.record.apply(&patch);
        Ok(())
    }

    async fn delete(&self, id: &PlaylistId) -> Result<()> {
        self.playlists.write().await.retain(|p| &p.id != id);
        Ok(())
    }

    async fn find_user(&self, email: &str) -> Result<Option<UserProfile>> {
        Ok(self.users.read().await.get(email).cloned())
    }
}

/// Vote ledger that lasts as long as the process: one vote per session.
#[derive(Default)]
pub struct SessionVoteLedger {
    votes: RwLock<HashSet<(UserId, PlaylistId)>>,
}

impl SessionVoteLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoteLedger for SessionVoteLedger {
    async fn has_voted(&self, viewer: &UserId, playlist: &PlaylistId) -> Result<bool> {
        Ok(self
            .votes
            .read()
            .await
            .contains(&(viewer.clone(), playlist.clone())))
    }

    async fn record(&self, viewer: &UserId, playlist: &PlaylistId, vote: VoteType) -> Result<bool> {
        let inserted = self
            .votes
            .write()
            .await
            .insert((viewer.clone(), playlist.clone()));
        debug!(viewer = %viewer, playlist_id = %playlist, vote = vote.as_str(), inserted, "Vote recorded for session");
        Ok(inserted)
    }

    async fn retract(&self, viewer: &UserId, playlist: &PlaylistId) -> Result<()> {
        self.votes
            .write()
            .await
            .remove(&(viewer.clone(), playlist.clone()));
        debug!(viewer = %viewer, playlist_id = %playlist, "Vote retracted for session");
        Ok(())
    }
}
