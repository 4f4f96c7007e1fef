//! Blastline error types.

use thiserror::Error;

/// Convenience alias used across all Blastline crates.
pub type Result<T> = std::result::Result<T, BlastlineError>;

/// Unified error type for Blastline.
#[derive(Error, Debug)]
pub enum BlastlineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Campaign error: {0}")]
    Campaign(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
