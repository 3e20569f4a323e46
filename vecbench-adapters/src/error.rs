//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when talking to a vector database.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// HTTP request failed or the API returned an error status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The collection does not exist.
    #[error("Collection '{0}' not found")]
    NotFound(String),

    /// Vectors and payloads passed to an upsert differ in length.
    #[error("Number of vectors ({vectors}) must match number of payloads ({payloads})")]
    LengthMismatch { vectors: usize, payloads: usize },

    /// A vector does not have the collection's dimensionality.
    #[error("Expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Operation not supported by this database.
    #[error("Feature not supported: {0}")]
    Unsupported(String),
}

#[cfg(feature = "chroma")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else if err.is_decode() {
            AdapterError::Parse(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}
