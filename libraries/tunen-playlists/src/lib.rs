//! Tune'n Playlists
//!
//! Screen state for the playlist flows, independent of how it is rendered.
//!
//! # Components
//!
//! - [`PlaylistViewModel`]: load, create, remove, append and vote on
//!   document-store playlists
//! - [`TrackSearch`]: catalog track search with a selection that is appended
//!   to a catalog playlist
//! - [`resolve_tracks`]: concurrent metadata lookup for a playlist's tracks
//! - [`NoticeBoard`]: dismissible success and failure notices
//!
//! Loads and searches carry a [`Ticket`] from a [`RequestTracker`]; a result
//! whose ticket has been superseded is dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tunen_core::{DocumentStore, UserId, VoteLedger, VoteType};
//! use tunen_playlists::PlaylistViewModel;
//!
//! # async fn example(
//! #     store: Arc<dyn DocumentStore>,
//! #     ledger: Arc<dyn VoteLedger>,
//! # ) -> tunen_core::Result<()> {
//! let alice = UserId::new("alice");
//! let view = PlaylistViewModel::new(alice.clone(), store, ledger);
//!
//! let id = view.create("road trip", vec![], None, alice.clone()).await?;
//! view.vote(&id, VoteType::Upvote).await?;
//! view.dispose();
//! # Ok(())
//! # }
//! ```

mod details;
mod notices;
mod search;
mod selection;
mod tracker;
mod viewmodel;

pub use details::resolve_tracks;
pub use notices::{Notice, NoticeBoard, NoticeLevel};
pub use search::{TrackSearch, DEFAULT_SEARCH_LIMIT};
pub use selection::TrackSelection;
pub use tracker::{Outcome, RequestTracker, Ticket};
pub use viewmodel::PlaylistViewModel;
