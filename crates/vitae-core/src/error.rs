//! Error types for vitae.

use thiserror::Error;

/// Result type alias using vitae's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vitae operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Taxonomy dataset missing or corrupt (fatal at startup)
    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    /// Embedding cache artifact invalid or unwritable
    #[error("Cache error: {0}")]
    Cache(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Matching operation failed
    #[error("Match error: {0}")]
    Match(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
