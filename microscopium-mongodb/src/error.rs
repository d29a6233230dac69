//! Error types for document store operations.

use thiserror::Error;

/// Result type for document store operations.
pub type MongoResult<T> = Result<T, MongoError>;

/// Errors that can occur while reading from the document store.
#[derive(Error, Debug)]
pub enum MongoError {
    /// MongoDB driver error.
    #[error("mongodb error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// Extended JSON could not be turned back into BSON.
    #[error("extended json error: {0}")]
    ExtJson(#[from] bson::extjson::de::Error),

    /// Reading fixture files failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON text could not be produced or parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("query error: {0}")]
    Query(String),

    /// Document not found.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Document serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MongoError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
