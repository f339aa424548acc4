//! Error types for circle.

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
///
/// Domain variants carry the message shown to the client and an
/// `error_type` naming the operation that failed (e.g. `"Add Friend Error"`).
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("{message}")]
    NotFound {
        message: String,
        error_type: &'static str,
    },

    #[error("{message}")]
    Forbidden {
        message: String,
        error_type: &'static str,
    },

    #[error("{message}")]
    InvalidState {
        message: String,
        error_type: &'static str,
    },

    #[error("{message}")]
    Conflict {
        message: String,
        error_type: &'static str,
    },

    #[error("{message}")]
    BadRequest {
        message: String,
        error_type: &'static str,
    },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// A referenced record does not exist (or is soft-deleted).
    pub fn not_found(message: impl Into<String>, error_type: &'static str) -> Self {
        Self::NotFound {
            message: message.into(),
            error_type,
        }
    }

    /// The caller is not allowed to act on the record.
    pub fn forbidden(message: impl Into<String>, error_type: &'static str) -> Self {
        Self::Forbidden {
            message: message.into(),
            error_type,
        }
    }

    /// The record is in a state that does not allow the transition.
    pub fn invalid_state(message: impl Into<String>, error_type: &'static str) -> Self {
        Self::InvalidState {
            message: message.into(),
            error_type,
        }
    }

    /// The record would collide with an existing one.
    pub fn conflict(message: impl Into<String>, error_type: &'static str) -> Self {
        Self::Conflict {
            message: message.into(),
            error_type,
        }
    }

    /// Any other rejected request.
    pub fn bad_request(message: impl Into<String>, error_type: &'static str) -> Self {
        Self::BadRequest {
            message: message.into(),
            error_type,
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Domain errors are all reported as 400, like validation errors.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound { .. }
            | Self::Forbidden { .. }
            | Self::InvalidState { .. }
            | Self::Conflict { .. }
            | Self::BadRequest { .. }
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the `errorType` reported in the error envelope.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { error_type, .. }
            | Self::Forbidden { error_type, .. }
            | Self::InvalidState { error_type, .. }
            | Self::Conflict { error_type, .. }
            | Self::BadRequest { error_type, .. } => error_type,
            Self::Validation(_) => "Validation Error",
            Self::Unauthorized(_) => "Authentication Error",
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => "Internal Server Error",
        }
    }

    /// Returns the error code used in logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::Conflict { .. } => "CONFLICT",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
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
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        // Internal details stay in the log.
        let message = if self.is_server_error() {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "errorType": self.error_type(),
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_bad_request() {
        let errors = [
            AppError::not_found("Post not found", "Get Post Error"),
            AppError::forbidden("Only author can edit post", "Update Post Error"),
            AppError::invalid_state("Users are already friends", "Add Friend Error"),
            AppError::conflict("User already exists", "Registration Error"),
            AppError::bad_request("Wrong password", "Login Error"),
        ];

        for err in errors {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(!err.is_server_error());
        }
    }

    #[test]
    fn test_error_type_comes_from_domain_error() {
        let err = AppError::not_found("Post not found", "Create Comment Error");
        assert_eq!(err.error_type(), "Create Comment Error");
        assert_eq!(err.to_string(), "Post not found");
    }

    #[test]
    fn test_unauthorized_status() {
        let err = AppError::Unauthorized("Login required".to_string());
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_type(), "Authentication Error");
    }

    #[test]
    fn test_server_errors() {
        let err = AppError::Database("connection reset".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
        assert_eq!(err.error_type(), "Internal Server Error");
    }

    #[tokio::test]
    async fn test_into_response_envelope() {
        let response =
            AppError::invalid_state("Users are already friends", "Add Friend Error").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Users are already friends");
        assert_eq!(body["errorType"], "Add Friend Error");
    }

    #[tokio::test]
    async fn test_into_response_hides_server_details() {
        let response = AppError::Database("password authentication failed".to_string())
            .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["message"], "Internal Server Error");
    }
}
