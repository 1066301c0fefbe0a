//! Tune'n Core
//!
//! Platform-agnostic core types, traits, and error handling for Tune'n.
//!
//! This crate provides the building blocks shared by the catalog client,
//! the document stores, the playlist view-model and the terminal front-end.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Playlist`, `TrackRef`, `PlaylistRecord`, `UserProfile`, etc.
//! - **Gateway Traits**: `CatalogGateway`, `DocumentStore`, `VoteLedger`
//! - **Voting Overlay**: the pure `apply_vote` transformation
//! - **Session Context**: the credential holder passed to every catalog call
//! - **Error Handling**: Unified `TuneError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use tunen_core::types::{Playlist, PlaylistId, UserId, VoteType};
//! use tunen_core::voting::apply_vote;
//!
//! let playlist = Playlist::new(PlaylistId::new("p1"), "road trip", UserId::new("alice"));
//! let voted = apply_vote(&playlist, VoteType::Upvote).unwrap();
//!
//! assert_eq!(voted.upvotes, 1);
//! assert!(voted.has_voted);
//! assert!(!playlist.has_voted);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod gateway;
pub mod session;
pub mod types;
pub mod voting;

// Re-export commonly used types
pub use error::{Result, TuneError};
pub use gateway::{CatalogGateway, DocumentStore, VoteLedger};
pub use session::{Credential, CredentialRefresher, NoRefresh, Session};

pub use types::{
    CatalogPlaylist, CatalogUser, NewPlaylist, Playlist, PlaylistId, PlaylistPatch,
    PlaylistRecord, Rating, SearchKind, SearchResults, StoredPlaylist, TrackId, TrackRef,
    UserId, UserProfile, VoteType,
};
