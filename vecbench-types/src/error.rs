//! Error types for reading and writing results documents.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while handling a results document.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Reading or writing the document failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not have the expected shape.
    #[error("Invalid results document: {0}")]
    Json(#[from] serde_json::Error),

    /// A `k=<n>` block is missing required fields.
    #[error("Invalid run block '{label}': {source}")]
    InvalidRun {
        label: String,
        #[source]
        source: serde_json::Error,
    },
}
