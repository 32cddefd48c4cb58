//! Error context utilities.

use super::types::ApiError;

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Add context to an error, converting to ApiError.
    fn context(self, context: impl Into<String>) -> Result<T, ApiError>;

    /// Add context for not found errors.
    fn not_found(self, resource: impl Into<String>) -> Result<T, ApiError>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ErrorContext<T> for Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::Internal(anyhow::Error::from(e).context(context.into())))
    }

    fn not_found(self, resource: impl Into<String>) -> Result<T, ApiError> {
        self.map_err(|_| ApiError::NotFound(resource.into()))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn context(self, context: impl Into<String>) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::NotFound(context.into()))
    }

    fn not_found(self, resource: impl Into<String>) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::NotFound(resource.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_not_found() {
        let missing: Option<u8> = None;
        let err = missing.not_found("Project").unwrap_err();
        assert_eq!(err.to_string(), "Project not found");
    }

    #[test]
    fn test_result_context_is_internal() {
        let failed: Result<u8, std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(matches!(failed.context("reading"), Err(ApiError::Internal(_))));
    }
}
