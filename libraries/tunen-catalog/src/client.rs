//! Main catalog client.

use crate::error::{CatalogError, Result};
use crate::playlists::PlaylistsClient;
use crate::tracks::TracksClient;
use crate::types::{ApiErrorBody, ApiUser, CatalogConfig};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use tunen_core::types::{
    CatalogPlaylist, CatalogUser, SearchKind, SearchResults, TrackId, TrackRef,
};
use tunen_core::{CatalogGateway, Session};

/// Client for the music catalog Web API.
///
/// The client holds no credential of its own: every call takes the
/// [`Session`] whose bearer token authorizes it.
///
/// # Example
///
/// ```ignore
/// use tunen_catalog::{CatalogClient, CatalogConfig};
/// use tunen_core::{Credential, Session, UserId};
///
/// let client = CatalogClient::new(CatalogConfig::default())?;
/// let session = Session::new(UserId::new("alice"), Credential::bearer(token));
///
/// let results = client.tracks().search(&session, "daft punk", SearchKind::Track, 10).await?;
/// println!("Found {} tracks", results.tracks.len());
/// ```
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let api_base = normalize_base(&config.api_base)?;
        let accounts_base = normalize_base(&config.accounts_base)?;

        // Create HTTP client with reasonable defaults
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Tunen/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CatalogError::Request)?;

        Ok(Self {
            http,
            config: CatalogConfig {
                api_base,
                accounts_base,
            },
        })
    }

    /// Web API base URL (normalized, no trailing slash).
    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }

    /// Accounts service base URL (normalized, no trailing slash).
    pub fn accounts_base(&self) -> &str {
        &self.config.accounts_base
    }

    /// Shared HTTP client, for token requests against the accounts service.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Search and track lookups.
    pub fn tracks(&self) -> TracksClient<'_> {
        TracksClient::new(&self.http, &self.config.api_base)
    }

    /// Playlist listing and mutation.
    pub fn playlists(&self) -> PlaylistsClient<'_> {
        PlaylistsClient::new(&self.http, &self.config.api_base)
    }

    /// Profile of the account that owns the session's credential.
    pub async fn current_user(&self, session: &Session) -> Result<CatalogUser> {
        let url = format!("{}/me", self.config.api_base);
        debug!(url = %url, "Fetching current user");

        let response = self
            .http
            .get(&url)
            .bearer_auth(session.access_token().await)
            .send()
            .await
            .map_err(send_error)?;

        let user: ApiUser = read_json(response, "user profile").await?;
        info!(user_id = %user.id, "Fetched current user");
        Ok(user.into())
    }
}

/// Validate and strip trailing slashes from a base URL.
fn normalize_base(url: &str) -> Result<String> {
    if url.is_empty() {
        return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
    }

    let url = url.trim_end_matches('/').to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CatalogError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    Ok(url)
}

/// Classify a transport failure.
pub(crate) fn send_error(e: reqwest::Error) -> CatalogError {
    if e.is_connect() || e.is_timeout() {
        CatalogError::ServerUnreachable(e.to_string())
    } else {
        CatalogError::Request(e)
    }
}

/// Decode a success body as `T`, or turn the response into an error.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| CatalogError::ParseError(format!("Failed to parse {}: {}", what, e)))
}

/// Pass success responses through; map everything else to a `CatalogError`.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    match status {
        StatusCode::UNAUTHORIZED => {
            warn!(error = %message, "Catalog rejected credential");
            Err(CatalogError::Unauthorized(message))
        }
        StatusCode::TOO_MANY_REQUESTS => Err(CatalogError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(1),
        }),
        _ => Err(CatalogError::ServerError {
            status: status.as_u16(),
            message,
        }),
    }
}

/// Prefer the vendor's `error.message`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl CatalogGateway for CatalogClient {
    async fn search(
        &self,
        session: &Session,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> tunen_core::Result<SearchResults> {
        Ok(self.tracks().search(session, query, kind, limit).await?)
    }

    async fn list_owner_playlists(
        &self,
        session: &Session,
    ) -> tunen_core::Result<Vec<CatalogPlaylist>> {
        Ok(self.playlists().list_mine(session).await?)
    }

    async fn create_playlist(
        &self,
        session: &Session,
        name: &str,
    ) -> tunen_core::Result<CatalogPlaylist> {
        Ok(self.playlists().create(session, name).await?)
    }

    async fn append_tracks(
        &self,
        session: &Session,
        playlist_id: &str,
        uris: &[String],
    ) -> tunen_core::Result<()> {
        self.playlists()
            .append_tracks(session, playlist_id, uris)
            .await?;
        Ok(())
    }

    async fn get_track(&self, session: &Session, id: &TrackId) -> tunen_core::Result<TrackRef> {
        Ok(self.tracks().get_track(session, id).await?)
    }
}
