//! Errors raised while turning request parameters into queries.

use thiserror::Error;

/// Result type for query building.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while validating request parameters.
///
/// Both variants are client errors: the request cannot be answered as sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A required parameter was absent or empty.
    #[error("{0}")]
    MissingParameter(String),

    /// A parameter was present but its value could not be interpreted.
    #[error("invalid value '{value}' for parameter '{name}'")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// The rejected value.
        value: String,
    },
}

impl QueryError {
    /// Create a missing-parameter error with a message describing what is required.
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingParameter(message.into())
    }

    /// Create an invalid-parameter error.
    pub fn invalid(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Check if this is a missing-parameter error.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingParameter(_))
    }
}
