//! Tune'n terminal front-end
//!
//! Configuration, auth state, command handlers and text rendering for the
//! `tunen` binary. Exposed as a library so the handlers can be tested
//! without spawning the binary.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;

pub use app::{App, AuthState, CredentialFile, StoredCredential};
pub use config::TunenConfig;
pub use error::{CliError, Result};
