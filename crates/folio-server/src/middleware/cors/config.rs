//! CORS configuration types.

use crate::config::CorsSettings;
use std::collections::HashSet;
use std::time::Duration;

/// CORS configuration.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins, matched exactly.
    pub allowed_origins: HashSet<String>,
    /// Allowed methods.
    pub allowed_methods: Vec<String>,
    /// Allowed request headers.
    pub allowed_headers: Vec<String>,
    /// Exposed headers (accessible to client).
    pub exposed_headers: Vec<String>,
    /// Allow credentials (cookies, auth headers).
    pub allow_credentials: bool,
    /// Max age for preflight cache.
    pub max_age: Option<Duration>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: HashSet::new(),
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_headers: ["Content-Type", "Authorization", "Accept", "X-Request-ID"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exposed_headers: vec!["X-Request-ID".to_string()],
            allow_credentials: false,
            max_age: Some(Duration::from_secs(86400)), // 24 hours
        }
    }
}

impl CorsConfig {
    /// Build from the server configuration section.
    pub fn from_settings(settings: &CorsSettings) -> Self {
        super::CorsBuilder::new()
            .allow_origins(settings.allowed_origins.iter().map(|o| o.trim()))
            .allow_credentials(settings.allow_credentials)
            .max_age(Duration::from_secs(settings.max_age_secs))
            .build()
    }

    /// Check if origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.contains(origin)
    }

    /// Check if method is allowed.
    pub fn is_method_allowed(&self, method: &str) -> bool {
        self.allowed_methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}
