//! Session context
//!
//! The active credential lives here instead of in screen state. A `Session`
//! is passed to every catalog call; refreshing is delegated to an injected
//! [`CredentialRefresher`].

use crate::error::{Result, TuneError};
use crate::types::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Bearer credential issued by the catalog's authorization flow
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Credential with only an access token (implicit-grant redirect)
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Whether the credential is known to be past its expiry
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Strategy for obtaining a fresh credential
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    /// Produce a replacement for `current`
    async fn refresh(&self, current: &Credential) -> Result<Credential>;
}

/// Refresher for sessions that cannot be refreshed (implicit grant)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefresh;

#[async_trait]
impl CredentialRefresher for NoRefresh {
    async fn refresh(&self, _current: &Credential) -> Result<Credential> {
        Err(TuneError::AuthRequired)
    }
}

/// Authenticated session for one viewer
pub struct Session {
    viewer: UserId,
    credential: RwLock<Credential>,
    refresher: Arc<dyn CredentialRefresher>,
    /// Held while a refresh is in flight
    refreshing: Mutex<()>,
}

impl Session {
    /// Create a session that never refreshes
    pub fn new(viewer: UserId, credential: Credential) -> Self {
        Self::with_refresher(viewer, credential, Arc::new(NoRefresh))
    }

    /// Create a session with a refresh strategy
    pub fn with_refresher(
        viewer: UserId,
        credential: Credential,
        refresher: Arc<dyn CredentialRefresher>,
    ) -> Self {
        Self {
            viewer,
            credential: RwLock::new(credential),
            refresher,
            refreshing: Mutex::new(()),
        }
    }

    /// The viewer this session acts for
    pub fn viewer(&self) -> &UserId {
        &self.viewer
    }

    /// Current access token for the `Authorization: Bearer` header
    pub async fn access_token(&self) -> String {
        self.credential.read().await.access_token.clone()
    }

    /// Snapshot of the current credential
    pub async fn credential(&self) -> Credential {
        self.credential.read().await.clone()
    }

    /// Replace the credential (e.g. after a new login)
    pub async fn set_credential(&self, credential: Credential) {
        *self.credential.write().await = credential;
    }

    /// Ask the refresher for a new credential and store it.
    pub async fn refresh(&self) -> Result<()> {
        let _refreshing = self.refreshing.lock().await;
        self.refresh_locked().await
    }

    /// Refresh unless another caller already replaced `rejected`.
    ///
    /// Concurrent callers rejected with the same token wait for one refresh
    /// and share its result.
    async fn refresh_rejected(&self, rejected: &str) -> Result<()> {
        let _refreshing = self.refreshing.lock().await;
        if self.credential.read().await.access_token != rejected {
            debug!(viewer = %self.viewer, "Credential already refreshed");
            return Ok(());
        }
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<()> {
        let current = self.credential().await;
        let next = self.refresher.refresh(&current).await?;
        self.set_credential(next).await;
        debug!(viewer = %self.viewer, "Credential refreshed");
        Ok(())
    }

    /// Execute an operation with one refresh-and-retry on an unauthorized failure.
    pub async fn with_refresh<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let used = self.access_token().await;
        match operation().await {
            Err(e) if e.is_unauthorized() => {
                warn!(viewer = %self.viewer, "Credential rejected, attempting refresh");
                self.refresh_rejected(&used).await?;
                operation().await
            }
            other => other,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("viewer", &self.viewer)
            .finish_non_exhaustive()
    }
}
