//! Catalog playlist listing and mutation.

use crate::client::{read_json, send_error};
use crate::error::{CatalogError, Result};
use crate::types::{AddTracksRequest, ApiPlaylist, CreatePlaylistRequest, Paging, SnapshotResponse};
use reqwest::Client;
use tracing::{debug, info};
use tunen_core::types::CatalogPlaylist;
use tunen_core::Session;

/// The catalog accepts at most this many URIs per append request.
pub const MAX_URIS_PER_REQUEST: usize = 100;

/// Playlist client for the catalog Web API.
pub struct PlaylistsClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> PlaylistsClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Playlists owned or followed by the account.
    pub async fn list_mine(&self, session: &Session) -> Result<Vec<CatalogPlaylist>> {
        let url = format!("{}/me/playlists", self.base_url);
        debug!(url = %url, "Fetching account playlists");

        let response = self
            .http
            .get(&url)
            .bearer_auth(session.access_token().await)
            .send()
            .await
            .map_err(send_error)?;

        let page: Paging<ApiPlaylist> = read_json(response, "playlists response").await?;
        debug!(count = page.items.len(), total = ?page.total, "Fetched account playlists");

        Ok(page.items.into_iter().map(Into::into).collect())
    }

    /// Create an empty playlist on the account.
    pub async fn create(&self, session: &Session, name: &str) -> Result<CatalogPlaylist> {
        let url = format!("{}/me/playlists", self.base_url);
        debug!(url = %url, name = %name, "Creating playlist");

        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: None,
            public: None,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(session.access_token().await)
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let playlist: ApiPlaylist = read_json(response, "created playlist").await?;
        info!(playlist_id = %playlist.id, name = %playlist.name, "Playlist created");
        Ok(playlist.into())
    }

    /// Append track URIs, in order. Returns the final snapshot id.
    ///
    /// Lists longer than [`MAX_URIS_PER_REQUEST`] are sent in several
    /// requests; a failure stops at the failing chunk.
    pub async fn append_tracks(
        &self,
        session: &Session,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<String> {
        if uris.is_empty() {
            return Err(CatalogError::InvalidRequest("No track URIs to add".to_string()));
        }

        let url = format!("{}/playlists/{}/tracks", self.base_url, playlist_id);
        let mut snapshot_id = String::new();

        for chunk in uris.chunks(MAX_URIS_PER_REQUEST) {
            debug!(url = %url, count = chunk.len(), "Appending tracks");

            let request = AddTracksRequest {
                uris: chunk.to_vec(),
            };

            let response = self
                .http
                .post(&url)
                .bearer_auth(session.access_token().await)
                .json(&request)
                .send()
                .await
                .map_err(send_error)?;

            let snapshot: SnapshotResponse = read_json(response, "snapshot response").await?;
            snapshot_id = snapshot.snapshot_id;
        }

        info!(playlist_id = %playlist_id, added = uris.len(), "Tracks appended");
        Ok(snapshot_id)
    }
}
