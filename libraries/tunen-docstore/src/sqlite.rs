//! Local `SQLite` document store and durable vote ledger.

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};
use tunen_core::types::{
    PlaylistId, PlaylistPatch, PlaylistRecord, StoredPlaylist, UserId, UserProfile, VoteType,
};
use tunen_core::{DocumentStore, VoteLedger};

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before handing the pool to a store.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://tunen.db`)
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("SQLite pool ready");
    Ok(pool)
}

/// Timestamps are stored as fixed-width RFC 3339 text so they sort lexically.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::SerializationError(format!("bad timestamp {:?}: {}", value, e)))
}

fn count(value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| StoreError::SerializationError(format!("vote count out of range: {}", value)))
}

fn stored_from_row(row: &SqliteRow) -> Result<StoredPlaylist> {
    let songs: String = row.try_get("songs")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(StoredPlaylist {
        id: PlaylistId::new(row.try_get::<String, _>("id")?),
        record: PlaylistRecord {
            name: row.try_get("name")?,
            songs: serde_json::from_str(&songs)?,
            created_at: parse_timestamp(&created_at)?,
            image: row.try_get("image")?,
            username: row.try_get("username")?,
            upvotes: count(row.try_get("upvotes")?)?,
            downvotes: count(row.try_get("downvotes")?)?,
        },
    })
}

/// Document store backed by a local `SQLite` file.
///
/// Playlist ids are generated locally; everything else mirrors the hosted
/// collections.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) and migrate the database at `database_url`.
    pub async fn open(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert or replace a profile document.
    pub async fn upsert_user(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (email, followers, messages)
            VALUES (?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                followers = excluded.followers,
                messages = excluded.messages
            "#,
        )
        .bind(&profile.email)
        .bind(serde_json::to_string(&profile.followers)?)
        .bind(serde_json::to_string(&profile.messages)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_by_owner(&self, owner: &UserId) -> Result<Vec<StoredPlaylist>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, songs, created_at, image, username, upvotes, downvotes
            FROM playlists
            WHERE username = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(stored_from_row).collect()
    }

    async fn insert_record(&self, record: &PlaylistRecord) -> Result<PlaylistId> {
        let id = PlaylistId::generate();

        sqlx::query(
            r#"
            INSERT INTO playlists (id, name, songs, created_at, image, username, upvotes, downvotes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.as_str())
        .bind(&record.name)
        .bind(serde_json::to_string(&record.songs)?)
        .bind(format_timestamp(record.created_at))
        .bind(&record.image)
        .bind(&record.username)
        .bind(i64::from(record.upvotes))
        .bind(i64::from(record.downvotes))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn apply_patch(&self, id: &PlaylistId, patch: &PlaylistPatch) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, name, songs, created_at, image, username, upvotes, downvotes
            FROM playlists
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("Playlist", id.as_str()))?;

        let mut record = stored_from_row(&row)?.record;
        record.apply(patch);

        sqlx::query(
            r#"
            UPDATE playlists
            SET name = ?, songs = ?, image = ?, upvotes = ?, downvotes = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.name)
        .bind(serde_json::to_string(&record.songs)?)
        .bind(&record.image)
        .bind(i64::from(record.upvotes))
        .bind(i64::from(record.downvotes))
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_record(&self, id: &PlaylistId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn fetch_user(&self, email: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT email, followers, messages FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let followers: String = row.try_get("followers")?;
        let messages: String = row.try_get("messages")?;
        Ok(Some(UserProfile {
            email: row.try_get("email")?,
            followers: serde_json::from_str(&followers)?,
            messages: serde_json::from_str(&messages)?,
        }))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn query_by_owner(&self, owner: &UserId) -> tunen_core::Result<Vec<StoredPlaylist>> {
        let playlists = self.fetch_by_owner(owner).await?;
        debug!(owner = %owner, count = playlists.len(), "Fetched playlists");
        Ok(playlists)
    }

    async fn insert(&self, record: PlaylistRecord) -> tunen_core::Result<PlaylistId> {
        let id = self.insert_record(&record).await?;
        info!(playlist_id = %id, name = %record.name, "Playlist document created");
        Ok(id)
    }

    async fn update(&self, id: &PlaylistId, patch: PlaylistPatch) -> tunen_core::Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.apply_patch(id, &patch).await?;
        debug!(playlist_id = %id, "Playlist document updated");
        Ok(())
    }

    async fn delete(&self, id: &PlaylistId) -> tunen_core::Result<()> {
        let removed = self.delete_record(id).await?;
        debug!(playlist_id = %id, removed, "Playlist document deleted");
        Ok(())
    }

    async fn find_user(&self, email: &str) -> tunen_core::Result<Option<UserProfile>> {
        Ok(self.fetch_user(email).await?)
    }
}

/// Vote ledger that survives restarts: one vote per viewer and playlist, ever.
#[derive(Clone)]
pub struct SqliteVoteLedger {
    pool: SqlitePool,
}

impl SqliteVoteLedger {
    /// The pool must already be migrated.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn lookup(&self, viewer: &UserId, playlist: &PlaylistId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS voted FROM votes WHERE viewer = ? AND playlist_id = ?")
            .bind(viewer.as_str())
            .bind(playlist.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert_vote(&self, viewer: &UserId, playlist: &PlaylistId, vote: VoteType) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO votes (viewer, playlist_id, vote, voted_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(viewer.as_str())
        .bind(playlist.as_str())
        .bind(vote.as_str())
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_vote(&self, viewer: &UserId, playlist: &PlaylistId) -> Result<()> {
        sqlx::query("DELETE FROM votes WHERE viewer = ? AND playlist_id = ?")
            .bind(viewer.as_str())
            .bind(playlist.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl VoteLedger for SqliteVoteLedger {
    async fn has_voted(&self, viewer: &UserId, playlist: &PlaylistId) -> tunen_core::Result<bool> {
        Ok(self.lookup(viewer, playlist).await?)
    }

    async fn record(
        &self,
        viewer: &UserId,
        playlist: &PlaylistId,
        vote: VoteType,
    ) -> tunen_core::Result<bool> {
        let inserted = self.insert_vote(viewer, playlist, vote).await?;
        debug!(viewer = %viewer, playlist_id = %playlist, vote = vote.as_str(), inserted, "Vote recorded");
        Ok(inserted)
    }

    async fn retract(&self, viewer: &UserId, playlist: &PlaylistId) -> tunen_core::Result<()> {
        self.delete_vote(viewer, playlist).await?;
        debug!(viewer = %viewer, playlist_id = %playlist, "Vote retracted");
        Ok(())
    }
}
