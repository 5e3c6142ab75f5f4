use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::account_service::AccountServiceError;
use crate::services::auth_service::AuthServiceError;
use crate::services::lock_service::LockServiceError;
use crate::services::quiz_service::QuizServiceError;

// Type alias for Result with our ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Boundary error taxonomy. Every service failure is folded into one of
/// these before leaving the handler layer; the body envelope, not the HTTP
/// code, is what clients key on.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Database(e) => {
                tracing::error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = json!({
            "status": "error",
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

impl From<crate::repositories::RepositoryError> for ApiError {
    fn from(err: crate::repositories::RepositoryError) -> Self {
        use crate::repositories::RepositoryError;
        match err {
            RepositoryError::Database(e) => ApiError::Database(e),
            RepositoryError::NotFound => ApiError::NotFound("Row not found".to_string()),
            RepositoryError::AlreadyExists => ApiError::Conflict("Row already exists".to_string()),
        }
    }
}

impl From<AccountServiceError> for ApiError {
    fn from(err: AccountServiceError) -> Self {
        match err {
            AccountServiceError::MissingFields => ApiError::Validation(err.to_string()),
            AccountServiceError::UsernameTaken => ApiError::Conflict(err.to_string()),
            AccountServiceError::HashingError(_) => {
                tracing::error!("{}", err);
                ApiError::Internal
            }
            AccountServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::MissingUsername | AuthServiceError::MissingDevice => {
                ApiError::Validation(err.to_string())
            }
            AuthServiceError::UnknownUsername | AuthServiceError::WrongPassword => {
                ApiError::Auth(err.to_string())
            }
            AuthServiceError::DeviceNotFound => ApiError::NotFound(err.to_string()),
            AuthServiceError::NotYourChild => ApiError::Forbidden(err.to_string()),
            AuthServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<LockServiceError> for ApiError {
    fn from(err: LockServiceError) -> Self {
        match err {
            LockServiceError::StudentNotFound => ApiError::NotFound(err.to_string()),
            LockServiceError::NotYourChild => ApiError::Forbidden(err.to_string()),
            LockServiceError::InvalidTransition { .. } => ApiError::Validation(err.to_string()),
            LockServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<QuizServiceError> for ApiError {
    fn from(err: QuizServiceError) -> Self {
        match err {
            QuizServiceError::MissingFields | QuizServiceError::InvalidStudent => {
                ApiError::Validation(err.to_string())
            }
            QuizServiceError::Json(_) => {
                tracing::error!("{}", err);
                ApiError::Internal
            }
            QuizServiceError::Repository(e) => e.into(),
        }
    }
}
