//! Sync-specific error types
//!
//! Every dispatch-side variant (network, server, client, timeout) is folded
//! by the coordinator into the same "failed attempt" outcome; the variants
//! exist for diagnostics, not for branching. Lifecycle variants surface
//! misuse of start/stop.

use clubsync_domain::ClubSyncError;
use thiserror::Error;

/// Sync operation errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Sync already running")]
    AlreadyRunning,

    #[error("Sync not running")]
    NotRunning,

    #[error("Task join failed: {0}")]
    TaskJoin(String),
}

/// Convert from ClubSyncError to SyncError
impl From<ClubSyncError> for SyncError {
    fn from(err: ClubSyncError) -> Self {
        match err {
            ClubSyncError::Database(message) => Self::Database(message),
            ClubSyncError::Config(message) => Self::Config(message),
            ClubSyncError::Network(message) => Self::Network(message),
            ClubSyncError::NotFound(message) | ClubSyncError::InvalidInput(message) => {
                Self::Client(message)
            }
            ClubSyncError::Internal(message) => Self::Server(message),
        }
    }
}
