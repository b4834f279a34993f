//! Error types for reltime-core

use thiserror::Error;

/// Main error type for the reltime-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Input could not be interpreted as an instant
    #[error("invalid date {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },

    /// Timer registration or teardown failed
    #[error("timer error: {0}")]
    Timer(String),

    /// Logging setup failed
    #[error("logging error: {0}")]
    Logging(String),
}

/// Result type alias for reltime-core
pub type Result<T> = std::result::Result<T, Error>;
