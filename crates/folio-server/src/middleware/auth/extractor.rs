//! Authentication extractors for handlers.

use super::types::AuthUser;
use crate::domain::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Extractor for the authenticated caller (required).
pub struct Auth(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(Auth)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Extractor resolving the caller's stored profile.
///
/// Looks the profile up on every request so role changes apply at once.
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;
        let identity = state.resolver.resolve(&user.id.to_string()).await?;
        Ok(CurrentIdentity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use folio_common_core::{Timestamp, UserId};

    fn auth_user() -> AuthUser {
        AuthUser {
            id: UserId::new(),
            jti: "jti".into(),
            expires_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn test_auth_extractor_success() {
        let user = auth_user();
        let (mut parts, _) = Request::new(()).into_parts();
        parts.extensions.insert(user.clone());

        let Auth(extracted) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, user);
    }

    #[tokio::test]
    async fn test_auth_extractor_missing() {
        let (mut parts, _) = Request::new(()).into_parts();

        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
}
