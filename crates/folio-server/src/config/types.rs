//! Server configuration types.

use folio_common_secret::SecretString;
use serde::Deserialize;
use super::validation::ConfigError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main server configuration.
///
/// Built once at start-up and shared read-only through the application state.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration.
    pub server: ServerBindConfig,
    /// Credential configuration.
    pub auth: AuthConfig,
    /// Persistence collaborator configuration.
    pub backend: BackendConfig,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Load configuration from defaults, `CONFIG_PATH` and the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        super::loader::load_config()
    }

    /// Address the listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.socket_addr()
    }
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerBindConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Largest accepted request body.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// How long in-flight requests may drain after a shutdown signal.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_request_timeout() -> u64 {
    30
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_shutdown_timeout() -> u64 {
    10
}

impl ServerBindConfig {
    /// Socket address. The host is an IP literal or `localhost`.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?
        };
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Credential configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret the session credentials are signed with.
    #[serde(default)]
    pub jwt_secret: SecretString,
    /// Record logged-out credentials and reject them until they expire.
    #[serde(default)]
    pub revoke_on_logout: bool,
}

/// Which persistence collaborator to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local tables; for development and tests.
    Memory,
    /// Hosted Supabase project.
    Supabase,
}

/// Persistence collaborator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Backend selector.
    #[serde(default = "default_backend_kind")]
    pub kind: BackendKind,
    /// Collaborator endpoint.
    #[serde(default)]
    pub url: String,
    /// Public key.
    #[serde(default)]
    pub anon_key: SecretString,
    /// Privileged key, used only for storage uploads.
    #[serde(default)]
    pub service_role_key: Option<SecretString>,
    /// The hosted project's JWT secret. Writes are signed with it as the
    /// acting user so row-level security sees who is writing.
    #[serde(default)]
    pub jwt_secret: Option<SecretString>,
    /// Storage bucket holding project images.
    #[serde(default = "default_bucket")]
    pub storage_bucket: String,
    /// Tag catalogue loaded into the memory backend at start-up.
    #[serde(default)]
    pub technologies: Vec<TechnologySeed>,
}

/// One entry of the memory backend's tag catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TechnologySeed {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_backend_kind() -> BackendKind {
    BackendKind::Supabase
}

fn default_bucket() -> String {
    "project-images".to_string()
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins.
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
    /// Allow credentials.
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
    /// Max age for preflight cache.
    #[serde(default = "default_cors_max_age")]
    pub max_age_secs: u64,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
            allow_credentials: true,
            max_age_secs: default_cors_max_age(),
        }
    }
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

fn default_cors_max_age() -> u64 {
    86400
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl LoggingConfig {
    /// Convert into the logging crate's configuration.
    pub fn to_log_config(&self) -> folio_common_log::LogConfig {
        folio_common_log::LogConfig {
            level: folio_common_log::LogLevel::parse(&self.level).unwrap_or_default(),
            format: folio_common_log::LogFormat::parse(&self.format).unwrap_or_default(),
            source_location: false,
        }
    }
}
