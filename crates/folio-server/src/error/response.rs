//! Error response implementation.

use super::types::ApiError;
use crate::middleware::auth::CredentialError;
use crate::services::{uploads::file_too_large, ResolveError, MAX_IMAGE_BYTES};
use crate::store::StoreError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, warn};

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log based on error type
        if self.is_server_error() {
            error!(
                error = %self,
                detail = ?self,
                code = self.error_code(),
                "Server error occurred"
            );
        } else if self.is_auth_error() {
            warn!(
                error = %self,
                code = self.error_code(),
                "Auth error occurred"
            );
        }

        let status = self.status_code();
        let code = self.error_code();

        // Build response body
        let (message, details, fields) = match &self {
            ApiError::ValidationError(field_errors) => {
                (self.to_string(), None, Some(field_errors.clone()))
            }
            ApiError::FileTooLarge { limit_mb } => {
                let details = serde_json::json!({ "limit_bytes": limit_mb * 1024 * 1024 });
                (self.to_string(), Some(details), None)
            }
            ApiError::Internal(err) => {
                // Don't expose internal error details in production
                let message = if cfg!(debug_assertions) {
                    format!("{}: {}", self, err)
                } else {
                    "An internal error occurred".to_string()
                };
                (message, None, None)
            }
            ApiError::Upstream(detail) => {
                let message = if cfg!(debug_assertions) {
                    format!("{}: {}", self, detail)
                } else {
                    "An upstream error occurred".to_string()
                };
                (message, None, None)
            }
            _ => (self.to_string(), None, None),
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code,
                message,
                details,
                fields,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Conversion implementations
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Record".into()),
            StoreError::Conflict(what) => ApiError::Conflict(what),
            StoreError::InvalidCredentials => ApiError::InvalidCredentials,
            StoreError::EmailNotConfirmed => ApiError::EmailNotConfirmed,
            StoreError::Invalid(msg) => ApiError::BadRequest(msg),
            StoreError::Upstream(msg) => ApiError::Upstream(msg),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => ApiError::NotFound("User".into()),
            ResolveError::Upstream(err) => err.into(),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Malformed => ApiError::InvalidToken,
            CredentialError::Expired => ApiError::TokenExpired,
            CredentialError::Revoked => ApiError::TokenRevoked,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::ValidationError(fields)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            file_too_large(MAX_IMAGE_BYTES)
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("failed to sign credential"))
    }
}
