use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;
use todolist_core::db::DbError;
use todolist_core::{RepoError, ServiceError};

/// Errors from server bootstrap and lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("store error: {0}")]
    Store(#[from] RepoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Request-level errors, mapped onto HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or undecodable body, or invalid field values (400).
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Unknown item id (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate id or stale starting position (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A row in the shift band could not be written; nothing changed (409).
    #[error("update failed: {0}")]
    UpdateFailed(String),

    /// Begin/commit/rollback or storage failure (500).
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// The request was abandoned and its transaction rolled back.
    #[error("request cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::UpdateFailed(_) => StatusCode::CONFLICT,
            Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Self::TransactionFailed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::UpdateFailed(_) => "update_failed",
            Self::TransactionFailed(_) => "transaction_failed",
            Self::Cancelled => "cancelled",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::TransactionFailed(detail) | Self::Internal(detail) => {
                error!(
                    "event=http_error module=server status={} code={} error={}",
                    status.as_u16(),
                    self.code(),
                    detail
                );
                "internal server error".to_string()
            }
            other => {
                warn!(
                    "event=http_error module=server status={} code={}",
                    status.as_u16(),
                    other.code()
                );
                other.to_string()
            }
        };

        let body = Json(ErrorBody {
            code: self.code(),
            message,
        });
        (status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => Self::BadRequest(err.to_string()),
            ServiceError::NotFound(id) => Self::NotFound(format!("item {id}")),
            err @ ServiceError::DuplicateId(_) => Self::Conflict(err.to_string()),
            err @ ServiceError::StalePosition { .. } => Self::Conflict(err.to_string()),
            err @ ServiceError::UpdateFailed { .. } => Self::UpdateFailed(err.to_string()),
            ServiceError::TransactionFailed(err) => Self::TransactionFailed(err.to_string()),
            ServiceError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        ServiceError::from(value).into()
    }
}
