//! Error types for coach operations.

use database::DatabaseError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while handling a conversation or running a tick.
#[derive(Debug, Error)]
pub enum CoachError {
    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Message sending failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
