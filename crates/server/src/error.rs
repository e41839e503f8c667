//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field path, e.g. `blocks[2].content`.
    pub param: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            msg: msg.into(),
        }
    }
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// No session, or the session user no longer exists.
    #[error("not authenticated")]
    Unauthenticated,

    /// Unknown user or wrong password; the two are not told apart.
    #[error("Incorrect username and/or password")]
    InvalidCredentials,

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    /// Storage or infrastructure failure.
    #[error("service unavailable")]
    Unavailable(#[from] anyhow::Error),
}

impl AppError {
    /// Single-field validation error.
    pub fn invalid(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(param, msg)])
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ValidationBody {
    errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            AppError::Validation(errors) => (status, Json(ValidationBody { errors })).into_response(),
            AppError::Unavailable(e) => {
                tracing::error!(error = %format!("{e:#}"), "storage unavailable");
                (
                    status,
                    Json(ErrorBody {
                        error: "Service temporarily unavailable".to_string(),
                    }),
                )
                    .into_response()
            }
            other => (
                status,
                Json(ErrorBody {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
