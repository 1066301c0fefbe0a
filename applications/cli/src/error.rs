/// Front-end error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not logged in; run `tunen login-url` and then `tunen capture <url>`")]
    NotLoggedIn,

    #[error("No credential found in redirect URL")]
    NoCredentialInUrl,

    #[error("Credential file error: {0}")]
    CredentialFile(String),

    #[error(transparent)]
    Tune(#[from] tunen_core::TuneError),

    #[error(transparent)]
    Catalog(#[from] tunen_catalog::CatalogError),

    #[error(transparent)]
    Store(#[from] tunen_docstore::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
