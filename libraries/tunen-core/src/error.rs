/// Core error types for Tune'n
use crate::types::PlaylistId;
use thiserror::Error;

/// Result type alias using `TuneError`
pub type Result<T> = std::result::Result<T, TuneError>;

/// Status reported for failures that never produced an HTTP response.
pub const NO_STATUS: u16 = 0;

/// Core error type for Tune'n
///
/// Every variant is recoverable: callers surface it to the viewer as a
/// notice and keep the screen interactive.
#[derive(Error, Debug)]
pub enum TuneError {
    /// Invalid user input (empty playlist name, empty query, ...)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The music catalog answered with a non-success status or could not be reached.
    ///
    /// `status` is [`NO_STATUS`] for transport failures.
    #[error("Catalog service error ({status}): {message}")]
    RemoteService { status: u16, message: String },

    /// The document store answered with a non-success status or could not be reached.
    ///
    /// `status` is [`NO_STATUS`] for transport failures.
    #[error("Storage service error ({status}): {message}")]
    StorageService { status: u16, message: String },

    /// The viewer already voted on this playlist
    #[error("Already voted on playlist {0}")]
    AlreadyVoted(PlaylistId),

    /// Entity missing from local state
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Loading remote state failed; prior local state was kept
    #[error("Failed to fetch {what}: {source}")]
    Fetch {
        what: String,
        #[source]
        source: Box<TuneError>,
    },

    /// No credential available for an authenticated call
    #[error("Authentication required")]
    AuthRequired,

    /// The owner of the operation lost interest before it completed
    #[error("Operation cancelled")]
    Cancelled,

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl TuneError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a catalog service error
    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Self::RemoteService {
            status,
            message: msg.into(),
        }
    }

    /// Create a storage service error
    pub fn storage(status: u16, msg: impl Into<String>) -> Self {
        Self::StorageService {
            status,
            message: msg.into(),
        }
    }

    /// Wrap an error as a fetch failure for `what`
    pub fn fetch(what: impl Into<String>, source: TuneError) -> Self {
        Self::Fetch {
            what: what.into(),
            source: Box::new(source),
        }
    }

    /// Whether the failure means the credential was rejected or missing.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::AuthRequired => true,
            Self::RemoteService { status, .. } => *status == 401,
            Self::Fetch { source, .. } => source.is_unauthorized(),
            _ => false,
        }
    }
}
