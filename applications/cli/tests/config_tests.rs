/// Configuration loading tests
use std::io::Write;
use tempfile::NamedTempFile;
use tunen_cli::config::{StoreBackend, VotePersistence};
use tunen_cli::{CliError, TunenConfig};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_file_overrides_defaults() {
    let file = write_config(
        r#"
[catalog]
client_id = "abc"

[store]
backend = "rest"
rest_url = "https://store.example.com/v1"
api_key = "k"

[votes]
persistence = "session"

[search]
limit = 25
"#,
    );

    let config = TunenConfig::load(Some(file.path())).unwrap();
    config.validate().unwrap();

    assert_eq!(config.client_id().unwrap(), "abc");
    assert_eq!(config.store.backend, StoreBackend::Rest);
    assert_eq!(config.store.rest_url.as_deref(), Some("https://store.example.com/v1"));
    assert_eq!(config.votes.persistence, VotePersistence::Session);
    assert_eq!(config.search.limit, 25);
    // Untouched sections keep their defaults
    assert_eq!(config.catalog.redirect_uri, "http://localhost:19006/callback");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let result = TunenConfig::load(Some(std::path::Path::new("/nonexistent/tunen.toml")));
    assert!(matches!(result, Err(CliError::Config(_))));
}

#[test]
fn test_unknown_backend_is_rejected() {
    let file = write_config("[store]\nbackend = \"postgres\"\n");
    assert!(matches!(TunenConfig::load(Some(file.path())), Err(CliError::Config(_))));
}

#[test]
fn test_bad_redirect_uri_fails_validation() {
    let file = write_config("[catalog]\nredirect_uri = \"tunen://callback\"\n");
    let config = TunenConfig::load(Some(file.path())).unwrap();
    assert!(config.validate().is_err());
}
