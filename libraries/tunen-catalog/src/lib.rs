//! Tune'n Catalog Client
//!
//! HTTP client library for the music-streaming Web API.
//!
//! # Features
//!
//! - **Authorization**: implicit-grant redirect capture, code exchange, token refresh
//! - **Search**: track and playlist search
//! - **Playlists**: list, create, append tracks
//! - **Tracks**: single-track lookup, recently played
//!
//! Every call takes a [`tunen_core::Session`]; the client never stores or
//! refreshes credentials itself.
//!
//! # Example
//!
//! ```ignore
//! use tunen_catalog::{capture_access_token, AuthorizeRequest, CatalogClient, CatalogConfig};
//! use tunen_core::{Credential, Session, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = AuthorizeRequest::new("client-id", "http://localhost:19006/callback");
//!     println!("Open {}", request.url()?);
//!
//!     // ...after the browser redirects back:
//!     let token = capture_access_token(&request.redirect_uri, &redirected_url).unwrap();
//!     let session = Session::new(UserId::new("alice"), Credential::bearer(token));
//!
//!     let client = CatalogClient::new(CatalogConfig::default())?;
//!     let playlists = client.playlists().list_mine(&session).await?;
//!     println!("Found {} playlists", playlists.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod error;
mod playlists;
mod tracks;
mod types;

// Re-export main types
pub use auth::{
    capture_access_token, capture_code, capture_credential, AuthorizeRequest, ResponseType,
    TokenEndpoint, DEFAULT_SCOPES,
};
pub use client::CatalogClient;
pub use error::{CatalogError, Result};
pub use types::{CatalogConfig, TokenResponse, DEFAULT_ACCOUNTS_BASE, DEFAULT_API_BASE};

// Re-export sub-clients for direct use if needed
pub use playlists::{PlaylistsClient, MAX_URIS_PER_REQUEST};
pub use tracks::{TracksClient, MAX_LIMIT};
