//! API errors and their HTTP responses.
//!
//! Every variant renders as a JSON body `{"message": "..."}`:
//! - `BadRequest` → 400
//! - `NotFound` → 404
//! - `Internal` → 500

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use microscopium_mongodb::MongoError;
use microscopium_query::QueryError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors a handler can answer with.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed request parameters (400).
    #[error("{0}")]
    BadRequest(String),

    /// A document the request depends on does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// Store failure or other unexpected error (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<MongoError> for ApiError {
    fn from(err: MongoError) -> Self {
        match err {
            MongoError::NotFound(what) => ApiError::NotFound(format!("Unable to find {}.", what)),
            other => {
                error!(error = %other, "Document store request failed");
                ApiError::Internal("The database request failed.".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_bad_requests() {
        let err: ApiError = QueryError::missing("A sample_id parameter must be supplied.").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "A sample_id parameter must be supplied.");

        let err: ApiError = QueryError::invalid("neighbours", "maybe").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_errors() {
        let err: ApiError = MongoError::not_found("sample s9").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Unable to find sample s9.");

        let err: ApiError = MongoError::connection("server selection timeout").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("timeout"));
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::BadRequest("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
