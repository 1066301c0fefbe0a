//! Error types for the catalog client.

use thiserror::Error;
use tunen_core::error::NO_STATUS;
use tunen_core::TuneError;

/// Errors that can occur when talking to the music catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Catalog returned an error response
    #[error("Catalog error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Bearer credential missing, expired or revoked
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Token endpoint refused the refresh token or authorization code
    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid base URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse catalog response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Catalog is offline or unreachable
    #[error("Catalog unreachable: {0}")]
    ServerUnreachable(String),

    /// Rate limited by the catalog
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
}

/// Result type for catalog client operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<CatalogError> for TuneError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ServerError { status, message } => TuneError::remote(status, message),
            CatalogError::Unauthorized(message) => TuneError::remote(401, message),
            CatalogError::RateLimited { .. } => TuneError::remote(429, err.to_string()),
            CatalogError::Request(e) => {
                let status = e.status().map_or(NO_STATUS, |s| s.as_u16());
                TuneError::remote(status, e.to_string())
            }
            CatalogError::TokenRequestFailed(_) => TuneError::AuthRequired,
            CatalogError::InvalidUrl(message) | CatalogError::InvalidRequest(message) => {
                TuneError::validation(message)
            }
            CatalogError::ParseError(_) | CatalogError::ServerUnreachable(_) => {
                TuneError::remote(NO_STATUS, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_401() {
        let err: TuneError = CatalogError::Unauthorized("The access token expired".into()).into();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn server_error_keeps_status() {
        let err: TuneError = CatalogError::ServerError {
            status: 404,
            message: "Non existing id".into(),
        }
        .into();
        match err {
            TuneError::RemoteService { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Non existing id");
            }
            other => panic!("Expected RemoteService, got {:?}", other),
        }
    }

    #[test]
    fn unreachable_has_no_status() {
        let err: TuneError = CatalogError::ServerUnreachable("connection refused".into()).into();
        assert!(matches!(err, TuneError::RemoteService { status: NO_STATUS, .. }));
    }
}
