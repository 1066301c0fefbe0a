//! Auth state and service wiring for the terminal front-end
//!
//! One `App` is built per invocation. It owns the catalog client, the
//! document store and the vote ledger chosen by configuration, and knows
//! whether a catalog credential is on disk.

use crate::config::{StoreBackend, TunenConfig, VotePersistence};
use crate::error::{CliError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tunen_catalog::{
    capture_code, capture_credential, AuthorizeRequest, CatalogClient, CatalogConfig,
    TokenEndpoint,
};
use tunen_core::types::{CatalogUser, UserId};
use tunen_core::{Credential, CredentialRefresher, DocumentStore, NoRefresh, Session, VoteLedger};
use tunen_docstore::{
    create_pool, run_migrations, MemoryDocumentStore, RestDocumentStore, SessionVoteLedger,
    SqliteDocumentStore, SqlitePool, SqliteVoteLedger,
};
use tunen_playlists::{PlaylistViewModel, TrackSearch};

/// Credential kept between invocations
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Catalog account id; also the owner of created playlists
    pub viewer: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCredential {
    pub fn new(user: &CatalogUser, credential: &Credential) -> Self {
        Self {
            viewer: user.id.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            access_token: credential.access_token.clone(),
            refresh_token: credential.refresh_token.clone(),
            expires_at: credential.expires_at,
        }
    }

    pub fn credential(&self) -> Credential {
        Credential {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.expires_at,
        }
    }

    /// Copy of `self` carrying a renewed credential
    #[must_use]
    pub fn renewed(&self, credential: &Credential) -> Self {
        Self {
            access_token: credential.access_token.clone(),
            refresh_token: credential.refresh_token.clone(),
            expires_at: credential.expires_at,
            ..self.clone()
        }
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("viewer", &self.viewer)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// JSON file holding the [`StoredCredential`]
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the credential; `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<StoredCredential>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let stored = serde_json::from_str(&contents).map_err(|e| {
            CliError::CredentialFile(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(stored))
    }

    pub fn save(&self, stored: &StoredCredential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(stored)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "Credential saved");
        Ok(())
    }

    /// Remove the credential; returns whether one was present.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Logged-in account and its catalog session
#[derive(Debug)]
pub struct Account {
    pub stored: StoredCredential,
    pub session: Arc<Session>,
}

impl Account {
    pub fn viewer(&self) -> &UserId {
        self.session.viewer()
    }
}

/// Whether a catalog credential is available
#[derive(Debug)]
pub enum AuthState {
    Unauthenticated,
    Authenticated(Account),
}

impl AuthState {
    pub fn resolve(stored: Option<StoredCredential>, refresher: Arc<dyn CredentialRefresher>) -> Self {
        match stored {
            None => AuthState::Unauthenticated,
            Some(stored) => {
                let session = Session::with_refresher(
                    UserId::new(stored.viewer.clone()),
                    stored.credential(),
                    refresher,
                );
                AuthState::Authenticated(Account {
                    stored,
                    session: Arc::new(session),
                })
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn account(&self) -> Result<&Account> {
        match self {
            AuthState::Authenticated(account) => Ok(account),
            AuthState::Unauthenticated => Err(CliError::NotLoggedIn),
        }
    }
}

/// Services for one invocation
pub struct App {
    config: TunenConfig,
    catalog: Arc<CatalogClient>,
    store: Arc<dyn DocumentStore>,
    ledger: Arc<dyn VoteLedger>,
    credentials: CredentialFile,
    auth: AuthState,
}

impl App {
    /// Build every service from configuration and read the stored credential.
    pub async fn new(config: TunenConfig) -> Result<Self> {
        config.validate()?;

        let catalog = CatalogClient::new(
            CatalogConfig::new(config.catalog.api_base.clone())
                .with_accounts_base(config.catalog.accounts_base.clone()),
        )?;

        let (store, store_pool) = open_store(&config).await?;
        let ledger = open_ledger(&config, store_pool).await?;

        let credentials = CredentialFile::new(config.session.credentials_path.clone());
        let mut app = Self {
            config,
            catalog: Arc::new(catalog),
            store,
            ledger,
            credentials,
            auth: AuthState::Unauthenticated,
        };
        app.auth = AuthState::resolve(app.credentials.load()?, app.refresher());

        info!(
            backend = ?app.config.store.backend,
            votes = ?app.config.votes.persistence,
            authenticated = app.auth.is_authenticated(),
            "Tunen ready"
        );
        Ok(app)
    }

    pub fn config(&self) -> &TunenConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn credentials(&self) -> &CredentialFile {
        &self.credentials
    }

    /// Authorization URL for the login step
    pub fn authorize_url(&self, code_flow: bool) -> Result<String> {
        let mut request = AuthorizeRequest::new(
            self.config.client_id()?,
            self.config.catalog.redirect_uri.clone(),
        );
        if code_flow {
            request = request.with_code_flow();
        }
        let url = request.url_for(self.catalog.accounts_base())?;
        Ok(url.to_string())
    }

    /// Complete a login from the URL the browser was redirected to.
    ///
    /// Accepts both the implicit-grant fragment and an authorization code.
    pub async fn capture(&mut self, redirected: &str) -> Result<CatalogUser> {
        let redirect_uri = self.config.catalog.redirect_uri.clone();

        let credential = if let Some(credential) = capture_credential(&redirect_uri, redirected) {
            credential
        } else if let Some(code) = capture_code(&redirect_uri, redirected) {
            self.token_endpoint()?
                .exchange_code(&code, &redirect_uri)
                .await?
        } else {
            return Err(CliError::NoCredentialInUrl);
        };

        // The viewer is unknown until the catalog says who the token belongs to
        let probe = Session::new(UserId::new(""), credential.clone());
        let user = self.catalog.current_user(&probe).await?;

        let stored = StoredCredential::new(&user, &credential);
        self.credentials.save(&stored)?;
        self.auth = AuthState::resolve(Some(stored), self.refresher());

        info!(viewer = %user.id, "Logged in");
        Ok(user)
    }

    /// Forget the stored credential; returns whether one existed.
    pub fn logout(&mut self) -> Result<bool> {
        self.auth = AuthState::Unauthenticated;
        let removed = self.credentials.clear()?;
        info!(removed, "Logged out");
        Ok(removed)
    }

    pub fn view_model(&self) -> Result<PlaylistViewModel> {
        let account = self.auth.account()?;
        Ok(PlaylistViewModel::new(
            account.viewer().clone(),
            self.store.clone(),
            self.ledger.clone(),
        ))
    }

    pub fn track_search(&self) -> Result<TrackSearch> {
        let account = self.auth.account()?;
        Ok(TrackSearch::new(self.catalog.clone(), account.session.clone())
            .with_limit(self.config.search.limit))
    }

    /// Write the session's credential back if a refresh replaced it.
    pub async fn persist_session(&self) -> Result<bool> {
        let AuthState::Authenticated(account) = &self.auth else {
            return Ok(false);
        };

        let current = account.session.credential().await;
        if current == account.stored.credential() {
            return Ok(false);
        }

        self.credentials.save(&account.stored.renewed(&current))?;
        debug!(viewer = %account.viewer(), "Refreshed credential persisted");
        Ok(true)
    }

    fn token_endpoint(&self) -> Result<TokenEndpoint> {
        Ok(TokenEndpoint::new(
            self.catalog.http().clone(),
            self.catalog.accounts_base(),
            self.config.client_id()?,
            self.config.catalog.client_secret.clone(),
        ))
    }

    fn refresher(&self) -> Arc<dyn CredentialRefresher> {
        match self.token_endpoint() {
            Ok(endpoint) => Arc::new(endpoint),
            Err(_) => Arc::new(NoRefresh),
        }
    }
}

async fn open_store(
    config: &TunenConfig,
) -> Result<(Arc<dyn DocumentStore>, Option<SqlitePool>)> {
    let settings = &config.store;
    match settings.backend {
        StoreBackend::Rest => {
            let url = settings
                .rest_url
                .clone()
                .ok_or_else(|| CliError::Config("store.rest_url is not set".to_string()))?;
            let store = RestDocumentStore::new(url, settings.api_key.clone())?;
            Ok((Arc::new(store), None))
        }
        StoreBackend::Sqlite => {
            ensure_sqlite_dir(&settings.database_url)?;
            let store = SqliteDocumentStore::open(&settings.database_url).await?;
            let pool = store.pool().clone();
            Ok((Arc::new(store), Some(pool)))
        }
        StoreBackend::Memory => {
            warn!("Memory store selected; playlists are lost on exit");
            Ok((Arc::new(MemoryDocumentStore::new()), None))
        }
    }
}

async fn open_ledger(
    config: &TunenConfig,
    store_pool: Option<SqlitePool>,
) -> Result<Arc<dyn VoteLedger>> {
    match config.votes.persistence {
        VotePersistence::Session => Ok(Arc::new(SessionVoteLedger::new())),
        VotePersistence::Durable => {
            let same_file = config.store.backend == StoreBackend::Sqlite
                && config.votes.database_url == config.store.database_url;
            let pool = match store_pool {
                Some(pool) if same_file => pool,
                _ => {
                    ensure_sqlite_dir(&config.votes.database_url)?;
                    let pool = create_pool(&config.votes.database_url).await?;
                    run_migrations(&pool).await?;
                    pool
                }
            };
            Ok(Arc::new(SqliteVoteLedger::new(pool)))
        }
    }
}

/// Create the directory of a file-backed SQLite URL.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_file(database_url) else {
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn sqlite_file(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}
