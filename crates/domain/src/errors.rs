//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for calsync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CalSyncError {
    /// No account (or no usable credential state) exists for the requested id.
    #[error("Unauthorized account: {0}")]
    UnauthorizedAccount(String),

    /// Any failure while fetching events from the remote source.
    #[error("Remote fetch error: {0}")]
    RemoteFetch(String),

    /// The remote source rejected the stored sync cursor.
    #[error("Sync cursor invalidated: {0}")]
    SyncCursorInvalidated(String),

    /// Failure reading or writing the local event set or account records.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CalSyncError {
    /// True for every failure that originated in the remote event source.
    pub fn is_remote_fetch(&self) -> bool {
        matches!(self, Self::RemoteFetch(_) | Self::SyncCursorInvalidated(_))
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnauthorizedAccount(_) => "unauthorized_account",
            Self::RemoteFetch(_) => "remote_fetch",
            Self::SyncCursorInvalidated(_) => "sync_cursor_invalidated",
            Self::Store(_) => "store",
            Self::Auth(_) => "auth",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for calsync operations
pub type Result<T> = std::result::Result<T, CalSyncError>;
