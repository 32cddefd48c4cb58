//! Persistence collaborator errors.

use thiserror::Error;

/// Failure reported by a store port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("email not confirmed")]
    EmailNotConfirmed,

    #[error("rejected by store: {0}")]
    Invalid(String),

    #[error("store unavailable: {0}")]
    Upstream(String),
}

impl StoreError {
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Self::Upstream(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
