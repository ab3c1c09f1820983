//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::storage::DatabaseError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    #[error("Missing required parameter: {0}")]
    MissingParam(&'static str),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Connection, query, or row-mapping failure. The message is passed
    /// through to the caller unchanged.
    #[error("{0}")]
    Database(DatabaseError),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParam(_) | Self::InvalidParam { .. } | Self::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            other => Self::Database(other),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
