/// Document store errors
use thiserror::Error;
use tunen_core::error::NO_STATUS;
use tunen_core::TuneError;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Document store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// HTTP request to the hosted store failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Hosted store returned an error response
    #[error("Store error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Hosted store is offline or unreachable
    #[error("Store unreachable: {0}")]
    ServerUnreachable(String),

    /// Invalid base URL
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    /// Document missing
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Stored value could not be decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// HTTP-like status for the failure, [`NO_STATUS`] when there is none
    pub fn status(&self) -> u16 {
        match self {
            Self::ServerError { status, .. } => *status,
            Self::NotFound { .. } => 404,
            Self::Request(e) => e.status().map_or(NO_STATUS, |s| s.as_u16()),
            _ => NO_STATUS,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<StoreError> for TuneError {
    fn from(err: StoreError) -> Self {
        let status = err.status();
        match err {
            StoreError::ServerError { message, .. } => TuneError::storage(status, message),
            other => TuneError::storage(status, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_keeps_status_and_message() {
        let err: TuneError = StoreError::ServerError {
            status: 503,
            message: "unavailable".into(),
        }
        .into();
        match err {
            TuneError::StorageService { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "unavailable");
            }
            other => panic!("Expected StorageService, got {:?}", other),
        }
    }

    #[test]
    fn missing_document_is_404() {
        let err: TuneError = StoreError::not_found("Playlist", "p1").into();
        assert!(matches!(err, TuneError::StorageService { status: 404, .. }));
    }

    #[test]
    fn decode_failures_have_no_status() {
        let err: TuneError = StoreError::SerializationError("bad songs".into()).into();
        assert!(matches!(err, TuneError::StorageService { status: NO_STATUS, .. }));
    }
}
