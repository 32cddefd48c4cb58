//! Authentication middleware layer.

use super::{jwt::CredentialValidator, types::AuthUser};
use crate::error::ApiError;
use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Authentication layer: validates the bearer credential and stores the
/// caller in request extensions.
#[derive(Clone)]
pub struct AuthLayer {
    validator: Arc<CredentialValidator>,
}

impl AuthLayer {
    /// Create new auth layer.
    pub fn new(validator: Arc<CredentialValidator>) -> Self {
        Self { validator }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            validator: self.validator.clone(),
        }
    }
}

/// Authentication middleware service.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    validator: Arc<CredentialValidator>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let validator = self.validator.clone();
        // Take the service that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match authenticate(&validator, &req) {
                Ok(auth_user) => {
                    req.extensions_mut().insert(auth_user);
                }
                Err(err) => return Ok(err.into_response()),
            }

            // Continue to handler
            inner.call(req).await
        })
    }
}

fn authenticate(validator: &CredentialValidator, req: &Request<Body>) -> Result<AuthUser, ApiError> {
    let token = extract_token(req)?;
    let claims = validator.validate(&token)?;
    AuthUser::from_claims(&claims).ok_or(ApiError::InvalidToken)
}

fn extract_token(req: &Request<Body>) -> Result<String, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::Unauthorized)?;
    let auth_str = auth_header.to_str().map_err(|_| ApiError::InvalidToken)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ApiError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::CredentialIssuer;
    use axum::http::StatusCode;
    use folio_common_core::UserId;
    use folio_common_secret::SecretString;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    fn secret() -> SecretString {
        SecretString::from("test_secret_key_that_is_32_chars!")
    }

    async fn call_protected(req: Request<Body>) -> Response {
        let validator = Arc::new(CredentialValidator::new(&secret()));
        let service = AuthLayer::new(validator).layer(service_fn(|req: Request<Body>| async move {
            let status = if req.extensions().get::<AuthUser>().is_some() {
                StatusCode::OK
            } else {
                StatusCode::IM_A_TEAPOT
            };
            Ok::<_, Infallible>(status.into_response())
        }));
        service.oneshot(req).await.unwrap()
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let req = Request::builder()
            .header("Authorization", "Bearer test_token")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_token(&req).unwrap(), "test_token");
    }

    #[test]
    fn test_extract_token_missing() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert!(matches!(extract_token(&req), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_extract_token_wrong_scheme() {
        let req = Request::builder()
            .header("Authorization", "Basic abc")
            .body(Body::empty())
            .unwrap();
        assert!(matches!(extract_token(&req), Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let issued = CredentialIssuer::new(&secret()).issue(UserId::new()).unwrap();
        let req = Request::builder()
            .header("Authorization", format!("Bearer {}", issued.token))
            .body(Body::empty())
            .unwrap();

        let response = call_protected(req).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let response = call_protected(req).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tampered_token_is_403() {
        let issued = CredentialIssuer::new(&secret()).issue(UserId::new()).unwrap();
        let req = Request::builder()
            .header("Authorization", format!("Bearer {}x", issued.token))
            .body(Body::empty())
            .unwrap();

        let response = call_protected(req).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
