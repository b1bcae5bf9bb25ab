//! HTTP error responses for contest-admin
//!
//! Every variant renders a JSON object with an `error` string. Batch and
//! persistence failures also carry `details` so an administrator can fix the
//! source file in one pass.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::BatchError;
use crate::models::RowError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid admin token presented (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated, but not an administrator (403)
    #[error("Admin access required")]
    Forbidden,

    /// Malformed request (400)
    #[error("{0}")]
    BadRequest(String),

    /// CSV could not be split into rows (400)
    #[error("CSV parsing failed")]
    CsvParse(Vec<String>),

    /// No data rows (400)
    #[error("CSV file is empty")]
    EmptyFile,

    /// One or more rows failed validation (400)
    #[error("Data validation failed")]
    Validation(Vec<RowError>),

    /// Scoped delete or bulk insert failed (400, store detail passed through)
    #[error("{error}: {details}")]
    Persistence { error: String, details: String },

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Multipart body could not be read; keeps axum's status (413 over the limit)
    #[error("{0}")]
    Upload(#[from] MultipartError),

    /// contest-common error
    #[error("Common error: {0}")]
    Common(#[from] contest_common::Error),
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Parse(details) => ApiError::CsvParse(details),
            BatchError::Empty => ApiError::EmptyFile,
            BatchError::Invalid(rows) => ApiError::Validation(rows),
        }
    }
}

fn internal(details: String) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Internal server error", "details": details }),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authentication required" }),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Admin access required" }),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::CsvParse(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "CSV parsing failed", "details": details }),
            ),
            ApiError::EmptyFile => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "CSV file is empty" }),
            ),
            ApiError::Validation(rows) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Data validation failed",
                    "message": format!(
                        "{} row(s) have validation errors. Please fix them and try again.",
                        rows.len()
                    ),
                    "details": rows,
                }),
            ),
            ApiError::Persistence { error, details } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": error, "details": details }),
            ),
            ApiError::Upload(err) => (err.status(), json!({ "error": err.body_text() })),
            ApiError::Internal(details) => internal(details),
            ApiError::Common(ref err) => internal(err.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
