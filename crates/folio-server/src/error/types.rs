//! API error types.

use axum::http::StatusCode;
use std::collections::HashMap;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error enum covering all error cases.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    ValidationError(HashMap<String, Vec<String>>),

    #[error("File exceeds the {limit_mb} MB limit")]
    FileTooLarge { limit_mb: usize },

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    // 401 Unauthorized
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email not confirmed")]
    EmailNotConfirmed,

    #[error("Token expired, please sign in again")]
    TokenExpired,

    #[error("Token revoked, please sign in again")]
    TokenRevoked,

    // 403 Forbidden
    #[error("Invalid token")]
    InvalidToken,

    #[error("Resource access denied: {0}")]
    ResourceAccessDenied(String),

    // 404 Not Found
    #[error("{0} not found")]
    NotFound(String),

    // 409 Conflict
    #[error("Resource already exists: {0}")]
    Conflict(String),

    // 500 Internal Server Error
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error("Upstream store error")]
    Upstream(String),
}

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::ValidationError(_)
            | Self::FileTooLarge { .. }
            | Self::UnsupportedMediaType(_) => StatusCode::BAD_REQUEST,

            Self::Unauthorized
            | Self::InvalidCredentials
            | Self::EmailNotConfirmed
            | Self::TokenExpired
            | Self::TokenRevoked => StatusCode::UNAUTHORIZED,

            Self::InvalidToken | Self::ResourceAccessDenied(_) => StatusCode::FORBIDDEN,

            Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::Conflict(_) => StatusCode::CONFLICT,

            Self::Internal(_) | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::ValidationError(_) => "validation_error",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::Unauthorized => "unauthorized",
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailNotConfirmed => "email_not_confirmed",
            Self::TokenExpired => "token_expired",
            Self::TokenRevoked => "token_revoked",
            Self::InvalidToken => "invalid_token",
            Self::ResourceAccessDenied(_) => "resource_access_denied",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
            Self::Upstream(_) => "upstream_error",
        }
    }

    /// Check if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Authentication and authorization failures.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.status_code(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::FileTooLarge { limit_mb: 5 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::ResourceAccessDenied("not owner".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::Conflict("slug".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Upstream("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_classification() {
        assert!(ApiError::InvalidCredentials.is_auth_error());
        assert!(ApiError::InvalidToken.is_auth_error());
        assert!(!ApiError::NotFound("Project".into()).is_auth_error());
        assert!(ApiError::BadRequest("x".into()).is_client_error());
    }
}
