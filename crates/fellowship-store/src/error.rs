//! Error types for the document store.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// RocksDB error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Partial update of a document that does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Malformed document or collection path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Stored value or update payload is not a JSON object
    #[error("Not a JSON object: {0}")]
    NotAnObject(String),
}

impl From<rocksdb::Error> for Error {
    fn from(e: rocksdb::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
