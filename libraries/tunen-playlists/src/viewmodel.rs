//! Playlist view-model
//!
//! Holds the playlists of the current screen, the track selection and the
//! notice board. State lives behind a lock that is never held across a
//! gateway call. Gateway calls race the view-model's interest token, so after
//! [`PlaylistViewModel::dispose`] pending calls are abandoned and nothing is
//! written back. Vote writes are the exception: they always finish.

use crate::notices::{Notice, NoticeBoard, NoticeLevel};
use crate::selection::TrackSelection;
use crate::tracker::{Outcome, RequestTracker};
use chrono::Utc;
use futures_util::future::join_all;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tunen_core::types::{
    NewPlaylist, Playlist, PlaylistId, PlaylistPatch, Rating, StoredPlaylist, TrackId, UserId,
    VoteType,
};
use tunen_core::voting::apply_vote;
use tunen_core::{DocumentStore, Result, TuneError, VoteLedger};

const LOAD_FAILED: &str = "Could not load playlists";
const CREATE_FAILED: &str = "Could not create playlist";
const REMOVE_FAILED: &str = "Could not remove playlist";
const APPEND_FAILED: &str = "Failed to add songs to the playlist";
const VOTE_FAILED: &str = "Could not record vote";
const RATE_FAILED: &str = "Could not rate playlist";

#[derive(Default)]
struct ViewState {
    playlists: HashMap<PlaylistId, Playlist>,
    selection: TrackSelection,
    /// Playlists with a vote in flight
    voting: HashSet<PlaylistId>,
    notices: NoticeBoard,
}

/// Render-agnostic state holder for the playlist screens
pub struct PlaylistViewModel {
    viewer: UserId,
    store: Arc<dyn DocumentStore>,
    ledger: Arc<dyn VoteLedger>,
    state: RwLock<ViewState>,
    loads: RequestTracker,
    interest: CancellationToken,
}

impl PlaylistViewModel {
    /// Create a view-model acting for `viewer`
    pub fn new(viewer: UserId, store: Arc<dyn DocumentStore>, ledger: Arc<dyn VoteLedger>) -> Self {
        Self {
            viewer,
            store,
            ledger,
            state: RwLock::default(),
            loads: RequestTracker::new(),
            interest: CancellationToken::new(),
        }
    }

    pub fn viewer(&self) -> &UserId {
        &self.viewer
    }

    /// Release interest: pending calls are abandoned and their results dropped
    pub fn dispose(&self) {
        debug!(viewer = %self.viewer, "Disposing playlist view-model");
        self.interest.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.interest.is_cancelled()
    }

    /// Playlists ordered by creation time
    pub async fn playlists(&self) -> Vec<Playlist> {
        let state = self.state.read().await;
        let mut playlists: Vec<Playlist> = state.playlists.values().cloned().collect();
        playlists.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        playlists
    }

    pub async fn playlist(&self, id: &PlaylistId) -> Option<Playlist> {
        self.state.read().await.playlists.get(id).cloned()
    }

    pub async fn selected_tracks(&self) -> Vec<TrackId> {
        self.state.read().await.selection.tracks().to_vec()
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.state.read().await.notices.notices().to_vec()
    }

    pub async fn dismiss_notice(&self, id: u64) -> bool {
        self.state.write().await.notices.dismiss(id)
    }

    /// Replace the mapping with `owner`'s playlists.
    ///
    /// On failure the previous mapping is kept. If another load was issued
    /// while this one was in flight, this result is dropped.
    pub async fn load(&self, owner: &UserId) -> Result<Outcome> {
        self.ensure_interested()?;
        let ticket = self.loads.issue();
        debug!(owner = %owner, ticket = ticket.id(), "Loading playlists");

        let fetched = self.guarded(self.fetch(owner)).await;

        let mut state = self.state.write().await;
        self.ensure_interested()?;
        if !self.loads.is_current(ticket) {
            debug!(ticket = ticket.id(), "Dropping superseded load");
            return Ok(Outcome::Superseded);
        }

        let fetched = match fetched {
            Ok(playlists) => playlists,
            Err(e) => {
                let err = TuneError::fetch("playlists", e);
                warn!(owner = %owner, error = %err, "Playlist load failed");
                state.notices.error(LOAD_FAILED, &err);
                return Err(err);
            }
        };

        let mut next = HashMap::with_capacity(fetched.len());
        for mut playlist in fetched {
            // Within a session counts never go backwards and a vote never un-happens
            if let Some(known) = state.playlists.get(&playlist.id) {
                playlist.upvotes = playlist.upvotes.max(known.upvotes);
                playlist.downvotes = playlist.downvotes.max(known.downvotes);
                playlist.has_voted |= known.has_voted;
            }
            next.insert(playlist.id.clone(), playlist);
        }

        let count = next.len();
        state.playlists = next;
        info!(owner = %owner, count, "Playlists loaded");
        Ok(Outcome::Applied(count))
    }

    /// Create a playlist and add it to the mapping.
    pub async fn create(
        &self,
        name: &str,
        initial_tracks: Vec<TrackId>,
        image: Option<String>,
        owner: UserId,
    ) -> Result<PlaylistId> {
        self.ensure_interested()?;

        if name.trim().is_empty() {
            let err = TuneError::validation("Playlist name cannot be empty");
            return Err(self.report(CREATE_FAILED, err).await);
        }

        let new_playlist = NewPlaylist {
            name: name.to_string(),
            tracks: initial_tracks,
            image,
            owner,
        };
        let record = new_playlist.to_record(Utc::now());

        let id = self
            .attempt(CREATE_FAILED, self.store.insert(record.clone()))
            .await?;
        let playlist = Playlist::from_stored(
            StoredPlaylist {
                id: id.clone(),
                record,
            },
            false,
        );

        let mut state = self.state.write().await;
        self.ensure_interested()?;
        state.playlists.insert(id.clone(), playlist);
        state
            .notices
            .success(format!("Playlist \"{}\" created!", name));

        info!(playlist_id = %id, name = %name, "Playlist created");
        Ok(id)
    }

    /// Delete a playlist known to the mapping.
    pub async fn remove(&self, id: &PlaylistId) -> Result<()> {
        self.ensure_interested()?;

        if !self.state.read().await.playlists.contains_key(id) {
            let err = TuneError::not_found("Playlist", id.as_str());
            return Err(self.report(REMOVE_FAILED, err).await);
        }

        self.attempt(REMOVE_FAILED, self.store.delete(id)).await?;

        let mut state = self.state.write().await;
        self.ensure_interested()?;
        state.playlists.remove(id);

        info!(playlist_id = %id, "Playlist removed");
        Ok(())
    }

    /// Flip selection of `track`; returns whether it is now selected.
    pub async fn toggle_track_selection(&self, track: &TrackId) -> Result<bool> {
        let mut state = self.state.write().await;
        self.ensure_interested()?;
        Ok(state.selection.toggle(track))
    }

    /// Append the selected tracks to a playlist's songs and deselect them.
    pub async fn append_selected(&self, id: &PlaylistId) -> Result<Playlist> {
        self.ensure_interested()?;

        let (playlist, selected) = {
            let state = self.state.read().await;
            (
                state.playlists.get(id).cloned(),
                state.selection.tracks().to_vec(),
            )
        };

        let Some(playlist) = playlist else {
            let err = TuneError::not_found("Playlist", id.as_str());
            return Err(self.report(APPEND_FAILED, err).await);
        };
        if selected.is_empty() {
            let err = TuneError::validation("No songs selected");
            return Err(self.report(APPEND_FAILED, err).await);
        }

        let mut tracks = playlist.tracks.clone();
        tracks.extend(selected.iter().cloned());

        self.attempt(APPEND_FAILED, self.store.update(id, PlaylistPatch::songs(&tracks)))
            .await?;

        let mut state = self.state.write().await;
        self.ensure_interested()?;
        for track in &selected {
            state.selection.remove(track);
        }

        let updated = match state.playlists.get_mut(id) {
            Some(current) => {
                current.tracks.clone_from(&tracks);
                current.clone()
            }
            None => Playlist { tracks, ..playlist },
        };
        state.notices.success("Songs added to the playlist!");

        info!(playlist_id = %id, added = selected.len(), "Songs appended");
        Ok(updated)
    }

    /// Cast the viewer's one vote on a playlist.
    pub async fn vote(&self, id: &PlaylistId, vote: VoteType) -> Result<Playlist> {
        self.ensure_interested()?;

        let claimed = {
            let mut state = self.state.write().await;
            match state.playlists.get(id).cloned() {
                None => Err(TuneError::not_found("Playlist", id.as_str())),
                Some(_) if !state.voting.insert(id.clone()) => {
                    Err(TuneError::AlreadyVoted(id.clone()))
                }
                Some(playlist) => Ok(playlist),
            }
        };
        let playlist = match claimed {
            Ok(playlist) => playlist,
            Err(e) => return Err(self.report(VOTE_FAILED, e).await),
        };

        let result = self.cast(playlist, vote).await;

        let mut state = self.state.write().await;
        self.ensure_interested()?;
        state.voting.remove(id);

        match result {
            Ok(voted) => {
                if let Some(current) = state.playlists.get_mut(id) {
                    *current = voted.clone();
                }
                state
                    .notices
                    .success(format!("Playlist {}!", vote.past_tense()));
                info!(playlist_id = %id, vote = vote.as_str(), "Vote recorded");
                Ok(voted)
            }
            Err(e) => {
                if matches!(e, TuneError::AlreadyVoted(_)) {
                    if let Some(current) = state.playlists.get_mut(id) {
                        current.has_voted = true;
                    }
                }
                warn!(playlist_id = %id, error = %e, "Vote failed");
                state.notices.error(VOTE_FAILED, &e);
                Err(e)
            }
        }
    }

    /// Claim the vote in the ledger, then write the counters.
    ///
    /// Neither write is abandoned on dispose. A failed counter write retracts
    /// the claim.
    async fn cast(&self, playlist: Playlist, vote: VoteType) -> Result<Playlist> {
        let voted = apply_vote(&playlist, vote)?;

        if !self.ledger.record(&self.viewer, &voted.id, vote).await? {
            return Err(TuneError::AlreadyVoted(voted.id));
        }

        if let Err(e) = self.store.update(&voted.id, PlaylistPatch::votes(&voted)).await {
            if let Err(retract) = self.ledger.retract(&self.viewer, &voted.id).await {
                warn!(playlist_id = %voted.id, error = %retract, "Could not retract vote claim");
            }
            return Err(e);
        }
        Ok(voted)
    }

    /// Award a rating badge; only surfaces a notice.
    pub async fn rate(&self, id: &PlaylistId, rating: Rating) -> Result<Notice> {
        self.ensure_interested()?;

        let mut state = self.state.write().await;
        let Some(name) = state.playlists.get(id).map(|p| p.name.clone()) else {
            let err = TuneError::not_found("Playlist", id.as_str());
            state.notices.error(RATE_FAILED, &err);
            return Err(err);
        };

        Ok(state.notices.push(
            NoticeLevel::Info,
            format!("Playlist \"{}\" rated as:", name),
            Some(rating.label().to_string()),
        ))
    }

    async fn fetch(&self, owner: &UserId) -> Result<Vec<Playlist>> {
        let stored = self.store.query_by_owner(owner).await?;
        let flags = join_all(
            stored
                .iter()
                .map(|p| self.ledger.has_voted(&self.viewer, &p.id)),
        )
        .await;

        stored
            .into_iter()
            .zip(flags)
            .map(|(p, voted)| Ok(Playlist::from_stored(p, voted?)))
            .collect()
    }

    fn ensure_interested(&self) -> Result<()> {
        if self.is_disposed() {
            Err(TuneError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run a gateway call unless interest is released first.
    async fn guarded<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            () = self.interest.cancelled() => Err(TuneError::Cancelled),
            result = operation => result,
        }
    }

    /// Like [`Self::guarded`], posting failures under `headline`.
    async fn attempt<T>(
        &self,
        headline: &str,
        operation: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.guarded(operation).await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.report(headline, e).await),
        }
    }

    async fn report(&self, headline: &str, err: TuneError) -> TuneError {
        if matches!(err, TuneError::Cancelled) || self.is_disposed() {
            return err;
        }
        warn!(error = %err, "{}", headline);
        self.state.write().await.notices.error(headline, &err);
        err
    }
}
