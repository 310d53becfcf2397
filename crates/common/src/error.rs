//! Error types for agora.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("{0} not found")]
    NotFound(String),

    #[error("Account does not exist")]
    UserNotFound,

    #[error("Post does not exist")]
    PostNotFound,

    #[error("Comment does not exist")]
    CommentNotFound,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Incorrect account or password")]
    InvalidCredentials,

    #[error("{0}")]
    BadRequest(String),

    #[error("Request format error: {0}")]
    Validation(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Request body too large")]
    PayloadTooLarge,

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::UserNotFound | Self::PostNotFound | Self::CommentNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PostNotFound => "POST_NOT_FOUND",
            Self::CommentNotFound => "COMMENT_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message safe to show to API clients.
    ///
    /// Server errors collapse into a generic message; details are only logged.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "success": false,
            "message": self.public_message(),
            "code": code,
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl AppError {
    /// Report the first failing field, taking `fields` as the declaration order.
    ///
    /// Fields missing from `fields` are ranked after it, by name.
    #[must_use]
    pub fn from_validation(err: &validator::ValidationErrors, fields: &[&str]) -> Self {
        let detail = err
            .field_errors()
            .into_iter()
            .min_by_key(|(field, _)| {
                let rank = fields
                    .iter()
                    .position(|name| name == field)
                    .unwrap_or(fields.len());
                (rank, *field)
            })
            .and_then(|(field, errors)| {
                errors.first().map(|e| {
                    e.message.as_ref().map_or_else(
                        || format!("{field} is invalid ({})", e.code),
                        ToString::to_string,
                    )
                })
            })
            .unwrap_or_else(|| err.to_string());

        Self::Validation(detail)
    }
}

/// Validation that reports failures in field declaration order.
pub trait ValidateInOrder: validator::Validate {
    /// Validated fields, in declaration order.
    const FIELDS: &'static [&'static str];

    /// Validate and map the first failing field to [`AppError::Validation`].
    fn validate_in_order(&self) -> AppResult<()> {
        self.validate()
            .map_err(|err| AppError::from_validation(&err, Self::FIELDS))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::from_validation(&err, &[])
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
