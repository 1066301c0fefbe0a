//! Tune'n Document Stores
//!
//! Implementations of the [`tunen_core::DocumentStore`] and
//! [`tunen_core::VoteLedger`] gateways.
//!
//! # Backends
//!
//! - **Hosted**: [`RestDocumentStore`] talks to the shared document database
//! - **Local**: [`SqliteDocumentStore`] keeps the same collections in a `SQLite` file
//! - **Memory**: [`MemoryDocumentStore`] for offline sessions and tests
//!
//! Vote ledgers come in two scopes: [`SessionVoteLedger`] forgets votes when
//! the process exits, [`SqliteVoteLedger`] remembers them.
//!
//! # Example
//!
//! ```rust,no_run
//! use tunen_core::{DocumentStore, UserId};
//! use tunen_docstore::{SqliteDocumentStore, SqliteVoteLedger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteDocumentStore::open("sqlite://tunen.db").await?;
//! let ledger = SqliteVoteLedger::new(store.pool().clone());
//!
//! let playlists = store.query_by_owner(&UserId::new("alice")).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod rest;
mod sqlite;

pub use error::{Result, StoreError};
pub use memory::{MemoryDocumentStore, SessionVoteLedger};
pub use rest::{RestDocumentStore, API_KEY_HEADER};
pub use sqlite::{create_pool, run_migrations, SqliteDocumentStore, SqliteVoteLedger};
pub use sqlx::SqlitePool;
