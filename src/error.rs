use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::{error_codes, error_to_api_response};

/// Error type shared by the store, the operations and the handlers.
///
/// `NotFound` deliberately covers "exists but you may not see it": callers
/// cannot tell a private recipe from a missing one.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A feature whose backing service is not configured.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// An external service answered with something unusable.
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            AppError::NotFound(_) => error_codes::NOT_FOUND,
            AppError::Forbidden(_) => error_codes::PERMISSION_DENIED,
            AppError::Conflict(_) => error_codes::CONFLICT,
            AppError::InvalidArgument(_) => error_codes::VALIDATION_ERROR,
            AppError::Unauthorized(_) => error_codes::AUTH_FAILED,
            AppError::Unavailable(_) => error_codes::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => error_codes::UPSTREAM_ERROR,
            AppError::Database(_) | AppError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "internal server error".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, error_to_api_response::<()>(self.code(), message)).into_response()
    }
}
