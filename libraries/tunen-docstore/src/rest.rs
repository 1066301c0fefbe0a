//! Hosted document store over its REST interface.

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use tunen_core::types::{PlaylistId, PlaylistPatch, PlaylistRecord, StoredPlaylist, UserId, UserProfile};
use tunen_core::DocumentStore;

/// Header carrying the project key, when the store requires one.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
struct InsertResponse {
    id: PlaylistId,
}

/// Client for a hosted document store exposing the `playlists` and `users`
/// collections.
///
/// # Example
///
/// ```ignore
/// use tunen_docstore::RestDocumentStore;
///
/// let store = RestDocumentStore::new("https://store.example.com/v1", Some(api_key))?;
/// let playlists = store.query_by_owner(&UserId::new("alice")).await?;
/// ```
#[derive(Clone)]
pub struct RestDocumentStore {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestDocumentStore {
    /// Create a new store client rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(StoreError::InvalidUrl("URL cannot be empty".into()));
        }
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(StoreError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Tunen/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Base URL (normalized, no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.authorize(request).send().await.map_err(send_error)
    }
}

fn send_error(e: reqwest::Error) -> StoreError {
    if e.is_connect() || e.is_timeout() {
        StoreError::ServerUnreachable(e.to_string())
    } else {
        StoreError::Request(e)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(StoreError::ServerError {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| StoreError::SerializationError(format!("Failed to parse {}: {}", what, e)))
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn query_by_owner(&self, owner: &UserId) -> tunen_core::Result<Vec<StoredPlaylist>> {
        let url = format!("{}/playlists", self.base_url);
        debug!(url = %url, owner = %owner, "Querying playlists");

        let response = self
            .send(self.http.get(&url).query(&[("username", owner.as_str())]))
            .await?;
        let playlists: Vec<StoredPlaylist> = read_json(response, "playlists").await?;

        debug!(count = playlists.len(), "Fetched playlists");
        Ok(playlists)
    }

    async fn insert(&self, record: PlaylistRecord) -> tunen_core::Result<PlaylistId> {
        let url = format!("{}/playlists", self.base_url);
        debug!(url = %url, name = %record.name, "Inserting playlist");

        let response = self.send(self.http.post(&url).json(&record)).await?;
        let created: InsertResponse = read_json(response, "insert response").await?;

        info!(playlist_id = %created.id, "Playlist document created");
        Ok(created.id)
    }

    async fn update(&self, id: &PlaylistId, patch: PlaylistPatch) -> tunen_core::Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let url = format!("{}/playlists/{}", self.base_url, id);
        debug!(url = %url, "Updating playlist");

        let response = self.send(self.http.patch(&url).json(&patch)).await?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &PlaylistId) -> tunen_core::Result<()> {
        let url = format!("{}/playlists/{}", self.base_url, id);
        debug!(url = %url, "Deleting playlist");

        let response = self.send(self.http.delete(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!(playlist_id = %id, "Playlist already gone from store");
            return Ok(());
        }
        check_status(response).await?;

        info!(playlist_id = %id, "Playlist document deleted");
        Ok(())
    }

    async fn find_user(&self, email: &str) -> tunen_core::Result<Option<UserProfile>> {
        let url = format!("{}/users", self.base_url);
        debug!(url = %url, "Looking up user profile");

        let response = self.send(self.http.get(&url).query(&[("email", email)])).await?;
        let users: Vec<UserProfile> = read_json(response, "users").await?;

        Ok(users.into_iter().find(|u| u.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            RestDocumentStore::new("", None),
            Err(StoreError::InvalidUrl(_))
        ));
        assert!(matches!(
            RestDocumentStore::new("store.example.com", None),
            Err(StoreError::InvalidUrl(_))
        ));
    }

    #[test]
    fn strips_trailing_slashes() {
        let store = RestDocumentStore::new("https://store.example.com/v1//", None).unwrap();
        assert_eq!(store.base_url(), "https://store.example.com/v1");
    }
}
