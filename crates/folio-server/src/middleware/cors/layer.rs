//! CORS middleware layer.

use super::config::CorsConfig;
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode},
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// CORS middleware layer.
#[derive(Clone)]
pub struct CorsLayer {
    config: Arc<CorsConfig>,
}

impl CorsLayer {
    pub fn new(config: CorsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for CorsLayer {
    type Service = CorsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorsMiddleware {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CorsMiddleware<S> {
    inner: S,
    config: Arc<CorsConfig>,
}

impl<S> Service<Request<Body>> for CorsMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let config = self.config.clone();
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            // Get origin from request
            let origin = req
                .headers()
                .get(header::ORIGIN)
                .and_then(|v| v.to_str().ok())
                .map(String::from);

            // Handle preflight request
            if req.method() == Method::OPTIONS
                && req.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
            {
                return Ok(handle_preflight(&config, origin.as_deref()));
            }

            // Call inner service
            let mut response = inner.call(req).await?;

            // Add CORS headers to response
            add_cors_headers(response.headers_mut(), &config, origin.as_deref());

            Ok(response)
        })
    }
}

fn insert_joined(headers: &mut HeaderMap, name: HeaderName, values: &[String]) {
    if let Ok(value) = HeaderValue::from_str(&values.join(", ")) {
        headers.insert(name, value);
    }
}

fn handle_preflight(config: &CorsConfig, origin: Option<&str>) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;

    match origin {
        Some(origin) if config.is_origin_allowed(origin) => {
            let headers = response.headers_mut();
            add_cors_headers(headers, config, Some(origin));

            insert_joined(
                headers,
                header::ACCESS_CONTROL_ALLOW_METHODS,
                &config.allowed_methods,
            );
            insert_joined(
                headers,
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                &config.allowed_headers,
            );

            if let Some(max_age) = config.max_age {
                headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age.as_secs()));
            }
        }
        _ => {
            *response.status_mut() = StatusCode::FORBIDDEN;
        }
    }

    response
}

fn add_cors_headers(headers: &mut HeaderMap, config: &CorsConfig, origin: Option<&str>) {
    let origin = match origin {
        Some(origin) if config.is_origin_allowed(origin) => origin,
        _ => return,
    };

    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        // Vary header for caching
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }

    if config.allow_credentials {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }

    if !config.exposed_headers.is_empty() {
        insert_joined(
            headers,
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            &config.exposed_headers,
        );
    }
}
