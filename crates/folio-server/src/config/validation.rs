//! Configuration validation.

use super::types::{BackendKind, ServerConfig};
use thiserror::Error;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("signing secret missing or shorter than {MIN_SECRET_LEN} characters")]
    InvalidJwtSecret,

    #[error("supabase backend requires backend.url")]
    MissingBackendUrl,

    #[error("supabase backend requires backend.anon_key")]
    MissingAnonKey,

    #[error("supabase backend requires backend.jwt_secret to sign writes")]
    MissingRowSecret,

    #[error("Invalid host: {0} (expected an IP address or localhost)")]
    InvalidHost(String),

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),
}

/// Validate server configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.auth.jwt_secret.len() < MIN_SECRET_LEN {
        errors.push(ConfigError::InvalidJwtSecret);
    }

    if config.backend.kind == BackendKind::Supabase {
        if url::Url::parse(&config.backend.url).is_err() {
            errors.push(ConfigError::MissingBackendUrl);
        }
        if config.backend.anon_key.is_empty() {
            errors.push(ConfigError::MissingAnonKey);
        }
        if config.backend.jwt_secret.as_ref().map_or(true, |s| s.is_empty()) {
            errors.push(ConfigError::MissingRowSecret);
        }
    }

    if let Err(err) = config.server.socket_addr() {
        errors.push(err);
    }

    if config.server.port == 0 {
        errors.push(ConfigError::InvalidPort(0));
    }

    if folio_common_log::LogLevel::parse(&config.logging.level).is_none() {
        errors.push(ConfigError::InvalidLogLevel(config.logging.level.clone()));
    }

    if folio_common_log::LogFormat::parse(&config.logging.format).is_none() {
        errors.push(ConfigError::InvalidLogFormat(config.logging.format.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
