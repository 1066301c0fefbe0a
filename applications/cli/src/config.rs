/// Client configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tunen_catalog::{DEFAULT_ACCOUNTS_BASE, DEFAULT_API_BASE, MAX_LIMIT};
use tunen_playlists::DEFAULT_SEARCH_LIMIT;

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "tunen.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TunenConfig {
    #[serde(default = "default_catalog")]
    pub catalog: CatalogSettings,

    #[serde(default = "default_store")]
    pub store: StoreSettings,

    #[serde(default = "default_votes")]
    pub votes: VoteSettings,

    #[serde(default = "default_session")]
    pub session: SessionSettings,

    #[serde(default = "default_search")]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub client_id: String,

    /// Only needed for the authorization-code flow
    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_accounts_base")]
    pub accounts_base: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted document database
    Rest,
    /// Local SQLite file
    Sqlite,
    /// Process memory; nothing survives exit
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub rest_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VotePersistence {
    /// One vote per playlist for as long as the process runs
    Session,
    /// One vote per playlist, ever
    Durable,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoteSettings {
    #[serde(default = "default_persistence")]
    pub persistence: VotePersistence,

    /// Where durable votes are kept
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

impl TunenConfig {
    /// Load configuration from file and environment
    ///
    /// `path` falls back to `tunen.toml` in the working directory; a missing
    /// file is not an error. Environment variables use the `TUNEN_` prefix
    /// and `__` between sections, e.g. `TUNEN_CATALOG__CLIENT_ID`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(CliError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        // Override with environment variables (prefixed with TUNEN_)
        settings = settings.add_source(
            config::Environment::with_prefix("TUNEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("catalog.redirect_uri", &self.catalog.redirect_uri),
            ("catalog.api_base", &self.catalog.api_base),
            ("catalog.accounts_base", &self.catalog.accounts_base),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CliError::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, url
                )));
            }
        }

        if self.store.backend == StoreBackend::Rest && self.store.rest_url.is_none() {
            return Err(CliError::Config(
                "store.rest_url is required for the rest backend (set TUNEN_STORE__REST_URL)"
                    .to_string(),
            ));
        }

        if self.search.limit == 0 || self.search.limit > MAX_LIMIT {
            return Err(CliError::Config(format!(
                "search.limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        Ok(())
    }

    /// Client id, required before talking to the accounts service
    pub fn client_id(&self) -> Result<&str> {
        if self.catalog.client_id.is_empty() {
            return Err(CliError::Config(
                "catalog.client_id is required (set TUNEN_CATALOG__CLIENT_ID)".to_string(),
            ));
        }
        Ok(&self.catalog.client_id)
    }
}

// Default values
fn default_catalog() -> CatalogSettings {
    CatalogSettings {
        client_id: String::new(),
        client_secret: None,
        redirect_uri: default_redirect_uri(),
        api_base: default_api_base(),
        accounts_base: default_accounts_base(),
    }
}

fn default_redirect_uri() -> String {
    "http://localhost:19006/callback".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_accounts_base() -> String {
    DEFAULT_ACCOUNTS_BASE.to_string()
}

fn default_store() -> StoreSettings {
    StoreSettings {
        backend: default_backend(),
        database_url: default_database_url(),
        rest_url: None,
        api_key: None,
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Sqlite
}

fn default_database_url() -> String {
    "sqlite://./data/tunen.db".to_string()
}

fn default_votes() -> VoteSettings {
    VoteSettings {
        persistence: default_persistence(),
        database_url: default_database_url(),
    }
}

fn default_persistence() -> VotePersistence {
    VotePersistence::Durable
}

fn default_session() -> SessionSettings {
    SessionSettings {
        credentials_path: default_credentials_path(),
    }
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("./data/credential.json")
}

fn default_search() -> SearchSettings {
    SearchSettings {
        limit: default_search_limit(),
    }
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

impl Default for TunenConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            store: default_store(),
            votes: default_votes(),
            session: default_session(),
            search: default_search(),
        }
    }
}
