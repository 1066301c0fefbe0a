//! Search and track lookups.

use crate::client::{read_json, send_error};
use crate::error::Result;
use crate::types::{ApiTrack, Paging, RecentlyPlayedItem, SearchResponse};
use reqwest::Client;
use tracing::debug;
use tunen_core::types::{SearchKind, SearchResults, TrackId, TrackRef};
use tunen_core::Session;

/// Largest page the catalog accepts for search and history requests.
pub const MAX_LIMIT: u32 = 50;

/// Track client for the catalog Web API.
pub struct TracksClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> TracksClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Search the catalog.
    ///
    /// `limit` is clamped to `1..=50`.
    pub async fn search(
        &self,
        session: &Session,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<SearchResults> {
        let url = format!("{}/search", self.base_url);
        let limit = limit.clamp(1, MAX_LIMIT);
        let limit_param = limit.to_string();
        debug!(url = %url, query = %query, kind = kind.as_str(), limit, "Searching catalog");

        let response = self
            .http
            .get(&url)
            .bearer_auth(session.access_token().await)
            .query(&[
                ("q", query),
                ("type", kind.as_str()),
                ("limit", limit_param.as_str()),
            ])
            .send()
            .await
            .map_err(send_error)?;

        let body: SearchResponse = read_json(response, "search response").await?;

        let results = SearchResults {
            tracks: body
                .tracks
                .map(|page| page.items.into_iter().map(TrackRef::from).collect())
                .unwrap_or_default(),
            playlists: body
                .playlists
                .map(|page| page.items.into_iter().flatten().map(Into::into).collect())
                .unwrap_or_default(),
        };

        debug!(
            tracks = results.tracks.len(),
            playlists = results.playlists.len(),
            "Search complete"
        );
        Ok(results)
    }

    /// Get a single track by ID.
    pub async fn get_track(&self, session: &Session, track_id: &TrackId) -> Result<TrackRef> {
        let url = format!("{}/tracks/{}", self.base_url, track_id);
        debug!(url = %url, track_id = %track_id, "Fetching track");

        let response = self
            .http
            .get(&url)
            .bearer_auth(session.access_token().await)
            .send()
            .await
            .map_err(send_error)?;

        let track: ApiTrack = read_json(response, "track response").await?;
        Ok(track.into())
    }

    /// Tracks the account played most recently, newest first.
    pub async fn recently_played(&self, session: &Session, limit: u32) -> Result<Vec<TrackRef>> {
        let url = format!("{}/me/player/recently-played", self.base_url);
        let limit = limit.clamp(1, MAX_LIMIT);
        debug!(url = %url, limit, "Fetching recently played");

        let response = self
            .http
            .get(&url)
            .bearer_auth(session.access_token().await)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(send_error)?;

        let page: Paging<RecentlyPlayedItem> =
            read_json(response, "recently played response").await?;
        Ok(page.items.into_iter().map(|item| item.track.into()).collect())
    }
}
