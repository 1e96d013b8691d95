//! API error types with IntoResponse
//!
//! Every failure leaves the server as `{"error": <code>, "message": <text>}`
//! with a matching status. This is the one place request errors are logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Pool exhausted or store unreachable (503, logged)
    Unavailable(sqlx::Error),

    /// Any other database error (500, logged)
    Database(DbError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(e) => {
                tracing::debug!(error = %e, "rejected request");
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                })
            }
            Self::NotFound { resource, id } => {
                tracing::debug!(resource, id = %id, "not found");
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                })
            }
            Self::Unavailable(e) => {
                tracing::error!(error = %e, "store unavailable");
                json!({
                    "error": "store_unavailable",
                    "message": "the database is currently unavailable"
                })
            }
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!(error = %e, "database error");
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Sqlx(e) if is_unavailable(&e) => Self::Unavailable(e),
            e => Self::Database(e),
        }
    }
}

/// Errors that mean "no usable connection" rather than "bad query".
fn is_unavailable(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
    )
}
