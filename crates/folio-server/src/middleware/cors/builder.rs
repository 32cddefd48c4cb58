//! CORS configuration builder.

use super::config::CorsConfig;
use std::time::Duration;

/// Builder for CORS configuration.
pub struct CorsBuilder {
    config: CorsConfig,
}

impl CorsBuilder {
    pub fn new() -> Self {
        Self {
            config: CorsConfig::default(),
        }
    }

    /// Allow specific origins. Empty entries are skipped.
    pub fn allow_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_origins = origins
            .into_iter()
            .map(Into::into)
            .filter(|o: &String| !o.is_empty())
            .collect();
        self
    }

    /// Set allowed methods.
    pub fn allow_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Allow credentials.
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.config.allow_credentials = allow;
        self
    }

    /// Set max age for preflight cache.
    pub fn max_age(mut self, duration: Duration) -> Self {
        self.config.max_age = Some(duration);
        self
    }

    /// Build the CORS configuration.
    pub fn build(self) -> CorsConfig {
        self.config
    }
}

impl Default for CorsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = CorsBuilder::new()
            .allow_origins(["https://example.com", "", "https://app.example.com"])
            .allow_methods(["GET", "POST"])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
            .build();

        assert!(config.is_origin_allowed("https://example.com"));
        assert!(!config.is_origin_allowed(""));
        assert!(!config.is_origin_allowed("https://other.com"));
        assert!(!config.is_method_allowed("DELETE"));
        assert!(config.allow_credentials);
    }
}
