//! Error types for ctfpost.

use thiserror::Error;

/// Errors that can occur in ctfpost operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Event source error: {0}")]
    Source(String),

    #[error("Event source request timed out after {0}s")]
    SourceTimeout(u64),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Cycle failed: {0}")]
    Cycle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for ctfpost operations.
pub type CoreResult<T> = Result<T, CoreError>;
