/// Common test utilities and fixtures
use tempfile::TempDir;
use tunen_cli::config::{StoreBackend, VotePersistence};
use tunen_cli::{CredentialFile, StoredCredential, TunenConfig};
use wiremock::MockServer;

pub const REDIRECT_URI: &str = "http://localhost:19006/callback";

/// Config pointing the catalog at `server`, with an in-memory store and
/// session votes. Credentials live in `dir`.
pub fn config_for(server: &MockServer, dir: &TempDir) -> TunenConfig {
    let mut config = TunenConfig::default();
    config.catalog.client_id = "cid".into();
    config.catalog.redirect_uri = REDIRECT_URI.into();
    config.catalog.api_base = server.uri();
    config.catalog.accounts_base = server.uri();
    config.store.backend = StoreBackend::Memory;
    config.votes.persistence = VotePersistence::Session;
    config.session.credentials_path = dir.path().join("credential.json");
    config
}

pub fn stored(access_token: &str) -> StoredCredential {
    StoredCredential {
        viewer: "alice".into(),
        display_name: Some("Alice".into()),
        email: Some("alice@example.com".into()),
        access_token: access_token.into(),
        refresh_token: Some("r-1".into()),
        expires_at: None,
    }
}

/// Write a credential so the next `App` starts authenticated
pub fn log_in(config: &TunenConfig, access_token: &str) {
    CredentialFile::new(config.session.credentials_path.clone())
        .save(&stored(access_token))
        .unwrap();
}

pub fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": "alice",
        "display_name": "Alice",
        "email": "alice@example.com",
        "images": []
    })
}

pub fn track_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "artists": [{ "name": "Daft Punk" }],
        "album": { "images": [] },
        "preview_url": null
    })
}
