//! Track search screen state.

use crate::notices::{Notice, NoticeBoard};
use crate::selection::TrackSelection;
use crate::tracker::{Outcome, RequestTracker};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tunen_core::types::{CatalogPlaylist, SearchKind, TrackId, TrackRef};
use tunen_core::{CatalogGateway, Result, Session, TuneError};

/// Results requested per search unless configured otherwise
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

const SEARCH_FAILED: &str = "Search failed";
const APPEND_FAILED: &str = "Failed to add songs to the playlist";
const PLAYLISTS_FAILED: &str = "Could not load playlists";

#[derive(Default)]
struct SearchState {
    query: String,
    results: Vec<TrackRef>,
    selection: TrackSelection,
    notices: NoticeBoard,
}

/// Catalog search with a selection that can be appended to a catalog playlist
///
/// Only the latest search is applied; a slower earlier response is dropped.
pub struct TrackSearch {
    catalog: Arc<dyn CatalogGateway>,
    session: Arc<Session>,
    limit: u32,
    state: RwLock<SearchState>,
    searches: RequestTracker,
    interest: CancellationToken,
}

impl TrackSearch {
    pub fn new(catalog: Arc<dyn CatalogGateway>, session: Arc<Session>) -> Self {
        Self {
            catalog,
            session,
            limit: DEFAULT_SEARCH_LIMIT,
            state: RwLock::default(),
            searches: RequestTracker::new(),
            interest: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn dispose(&self) {
        self.interest.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.interest.is_cancelled()
    }

    /// Query of the results currently shown
    pub async fn query(&self) -> String {
        self.state.read().await.query.clone()
    }

    pub async fn results(&self) -> Vec<TrackRef> {
        self.state.read().await.results.clone()
    }

    pub async fn selected(&self) -> Vec<TrackId> {
        self.state.read().await.selection.tracks().to_vec()
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.state.read().await.notices.notices().to_vec()
    }

    pub async fn dismiss_notice(&self, id: u64) -> bool {
        self.state.write().await.notices.dismiss(id)
    }

    /// Search tracks and replace the shown results.
    pub async fn search(&self, query: &str) -> Result<Outcome> {
        self.ensure_interested()?;

        let query = query.trim();
        if query.is_empty() {
            let err = TuneError::validation("Search query cannot be empty");
            return Err(self.report(SEARCH_FAILED, err).await);
        }

        let ticket = self.searches.issue();
        debug!(query = %query, ticket = ticket.id(), "Searching tracks");

        let (catalog, session, limit) = (&self.catalog, &self.session, self.limit);
        let found = self
            .guarded(session.with_refresh(|| catalog.search(session, query, SearchKind::Track, limit)))
            .await;

        let mut state = self.state.write().await;
        self.ensure_interested()?;
        if !self.searches.is_current(ticket) {
            debug!(query = %query, "Dropping superseded search");
            return Ok(Outcome::Superseded);
        }

        match found {
            Ok(results) => {
                let count = results.tracks.len();
                state.query = query.to_string();
                state.results = results.tracks;
                info!(query = %query, count, "Search results applied");
                Ok(Outcome::Applied(count))
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed");
                state.notices.error(SEARCH_FAILED, &e);
                Err(e)
            }
        }
    }

    /// Flip selection of `track`; returns whether it is now selected.
    pub async fn toggle(&self, track: &TrackId) -> Result<bool> {
        let mut state = self.state.write().await;
        self.ensure_interested()?;
        Ok(state.selection.toggle(track))
    }

    /// The account's catalog playlists, as targets for [`Self::add_selected`].
    pub async fn target_playlists(&self) -> Result<Vec<CatalogPlaylist>> {
        self.ensure_interested()?;
        let (catalog, session) = (&self.catalog, &self.session);
        match self
            .guarded(session.with_refresh(|| catalog.list_owner_playlists(session)))
            .await
        {
            Ok(playlists) => Ok(playlists),
            Err(TuneError::Cancelled) => Err(TuneError::Cancelled),
            Err(e) => {
                let err = TuneError::fetch("catalog playlists", e);
                Err(self.report(PLAYLISTS_FAILED, err).await)
            }
        }
    }

    /// Append the selected tracks to a catalog playlist and deselect them.
    ///
    /// Returns the number of tracks sent.
    pub async fn add_selected(&self, playlist_id: &str) -> Result<usize> {
        self.ensure_interested()?;

        let selected = self.selected().await;
        if selected.is_empty() {
            let err = TuneError::validation("No songs selected");
            return Err(self.report(APPEND_FAILED, err).await);
        }

        let uris: Vec<String> = selected.iter().map(TrackId::uri).collect();
        let (catalog, session) = (&self.catalog, &self.session);
        if let Err(e) = self
            .guarded(session.with_refresh(|| catalog.append_tracks(session, playlist_id, &uris)))
            .await
        {
            return Err(self.report(APPEND_FAILED, e).await);
        }

        let mut state = self.state.write().await;
        self.ensure_interested()?;
        for track in &selected {
            state.selection.remove(track);
        }
        state.notices.success("Songs added to the playlist!");

        info!(playlist_id = %playlist_id, added = selected.len(), "Songs added to catalog playlist");
        Ok(selected.len())
    }

    fn ensure_interested(&self) -> Result<()> {
        if self.is_disposed() {
            Err(TuneError::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn guarded<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            () = self.interest.cancelled() => Err(TuneError::Cancelled),
            result = operation => result,
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
