//! Error types for the hff repository filesystem.

use thiserror::Error;

/// Errors raised by a backend collaborator (hub client, in-memory store).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Not found in repository: {0}")]
    NotFound(String),

    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Command-level errors. Every variant maps to a stable exit code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    ConfigError(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("nothing matched: {0}")]
    NoMatch(String),

    #[error("{0}")]
    Backend(BackendError),

    #[error("upload of {file} failed: {source}")]
    UploadFailed {
        file: String,
        #[source]
        source: BackendError,
    },

    #[error("corrupt manifest {0}")]
    CorruptManifest(String),

    #[error("archive error: {0}")]
    ArchiveError(String),

    #[error("{0}")]
    Aborted(String),

    #[error("interrupted")]
    Interrupted,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ApiError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ApiError::ConfigError(_) | ApiError::InvalidArgument(_) => 2,
            ApiError::Interrupted => 130,
            _ => 1,
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(key) => ApiError::NotFound(key),
            other => ApiError::Backend(other),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
