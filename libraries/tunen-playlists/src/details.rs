//! Track metadata for a playlist's detail screen.

use futures_util::future::join_all;
use tracing::debug;
use tunen_core::types::{Playlist, TrackRef};
use tunen_core::{CatalogGateway, Result, Session, TuneError};

/// Fetch metadata for every track of `playlist`, in playlist order.
///
/// Lookups run concurrently. Any failed lookup fails the whole resolution
/// with [`TuneError::Fetch`].
pub async fn resolve_tracks(
    catalog: &dyn CatalogGateway,
    session: &Session,
    playlist: &Playlist,
) -> Result<Vec<TrackRef>> {
    debug!(playlist_id = %playlist.id, count = playlist.tracks.len(), "Resolving tracks");

    let lookups = playlist
        .tracks
        .iter()
        .map(|id| session.with_refresh(move || catalog.get_track(session, id)));

    join_all(lookups)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()
        .map_err(|e| TuneError::fetch("tracks", e))
}
