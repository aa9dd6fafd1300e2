use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::validation::FieldErrors;

pub const INVALID_LOGIN_MESSAGE: &str = "Email or password is incorrect.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),
    #[error("Conflict: {0}")]
    Conflict(FieldErrors),
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(FieldErrors),
    #[error("Too many login attempts")]
    RateLimited,
    #[error("Password hashing failed: {0}")]
    PasswordHashingError(String),
    #[error("JWT creation failed: {0}")]
    TokenCreationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// A failed login. Field problems are kept; the form-level message is
    /// always the same one.
    pub fn authentication_failed(mut errors: FieldErrors) -> Self {
        errors.add_non_field(INVALID_LOGIN_MESSAGE);
        AppError::AuthenticationFailed(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "errors": errors }),
            ),
            AppError::Conflict(errors) => (
                StatusCode::CONFLICT,
                serde_json::json!({ "errors": errors }),
            ),
            AppError::AuthenticationFailed(errors) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "errors": errors }),
            ),
            AppError::RateLimited => (
                StatusCode::FORBIDDEN,
                serde_json::json!({ "error": "Too many login attempts. Try again later." }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, serde_json::json!({ "error": msg }))
            }
            AppError::PasswordHashingError(msg) => {
                error!(error = %msg, "Password hashing failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": format!("Password hashing error: {msg}") }),
                )
            }
            AppError::TokenCreationError(msg) => {
                error!(error = %msg, "Session token creation failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": format!("Token creation error: {msg}") }),
                )
            }
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Database error" }),
                )
            }
            AppError::InternalServerError(msg) => {
                error!(error = %msg, "Internal error while handling request.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": msg }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
