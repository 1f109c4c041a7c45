//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application errors.
///
/// Every variant maps to a machine-readable `code` in the JSON error body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored value is present but cannot be interpreted.
    #[error("corrupt value for {field}: {value:?}")]
    DataIntegrity { field: &'static str, value: String },

    /// Timeout or connection failure talking to the catalog store.
    #[error("catalog store unavailable: {0}")]
    TransientStore(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::DataIntegrity { .. } => "DATA_INTEGRITY",
            AppError::TransientStore(_) => "STORE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DataIntegrity { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TransientStore(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientStore(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if is_transient(&err) {
            AppError::TransientStore(err.to_string())
        } else {
            AppError::Internal(anyhow::Error::new(err).context("database error"))
        }
    }
}

/// Classify a sqlx error as transient (retryable by the caller).
fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| {
            // 08xxx connection exceptions, 57014 statement timeout/cancel,
            // 57P01 admin shutdown, 57P03 cannot connect now.
            code.starts_with("08") || matches!(code.as_ref(), "57014" | "57P01" | "57P03")
        }),
        _ => false,
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side faults are logged in full; clients only get a summary.
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal server error");
                "internal server error".to_string()
            }
            AppError::DataIntegrity { field, value } => {
                tracing::error!(field = %field, value = %value, "corrupt catalog data");
                "stored catalog data is corrupt".to_string()
            }
            AppError::TransientStore(e) => {
                tracing::warn!(error = %e, "catalog store unavailable");
                "catalog store temporarily unavailable".to_string()
            }
            AppError::NotFound(_) | AppError::InvalidInput(_) => self.to_string(),
        };

        let body = ErrorBody {
            code: self.code(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
