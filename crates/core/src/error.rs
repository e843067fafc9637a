//! Error types for syncer-core
//!
//! Provides a unified error type for configuration, validation and storage
//! failures. Transfer operations never surface these directly: the gateway
//! folds them into failure results at the operation boundary.

use thiserror::Error;

/// Result type alias for syncer-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for syncer-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid user input: empty key, incomplete configuration, bad argument combination
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential, network or bucket reachability failure
    #[error("Connection error: {0}")]
    Connectivity(String),

    /// Permission denied by the backend
    #[error("Access denied: {0}")]
    Auth(String),

    /// Resource not found: local file, remote key, or bucket
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local destination already exists and overwrite was not requested
    #[error("Already exists: {0}")]
    Collision(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Whether the error means the backend could not be reached or refused us
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Error::Connectivity(_) | Error::Auth(_))
    }
}
