//! Shared fixtures for router-level tests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use folio_common_core::UserId;
use folio_common_secret::SecretString;
use folio_server::config::{
    AuthConfig, BackendConfig, BackendKind, CorsSettings, LoggingConfig, ServerBindConfig,
    ServerConfig,
};
use folio_server::routes::create_router;
use folio_server::store::{MemoryBackend, Store};
use folio_server::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "test-signing-secret-0123456789abcdef";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        server: ServerBindConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            body_limit_bytes: 10 * 1024 * 1024,
            shutdown_timeout_secs: 1,
        },
        auth: AuthConfig {
            jwt_secret: SecretString::from(SECRET),
            revoke_on_logout: false,
        },
        backend: BackendConfig {
            kind: BackendKind::Memory,
            url: String::new(),
            anon_key: SecretString::default(),
            service_role_key: None,
            jwt_secret: None,
            storage_bucket: "project-images".to_string(),
            technologies: Vec::new(),
        },
        cors: CorsSettings::default(),
        logging: LoggingConfig::default(),
    }
}

/// A router over a fresh in-memory backend.
pub struct TestApp {
    pub router: Router,
    pub backend: Arc<MemoryBackend>,
}

/// A registered account.
pub struct Account {
    pub id: UserId,
    pub token: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self::with_backend(config, MemoryBackend::new())
    }

    pub fn with_backend(config: ServerConfig, backend: MemoryBackend) -> Self {
        let backend = Arc::new(backend);
        let state = AppState::with_store(config, Store::from_backend(backend.clone()));
        Self {
            router: create_router(state),
            backend,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse { status, body }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn register(&self, email: &str, name: &str) -> Account {
        let response = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"email": email, "password": "secret1", "name": name})),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        Account {
            id: response.body["id"].as_str().unwrap().parse().unwrap(),
            token: response.body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_project(&self, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, "/api/projects", Some(token), Some(body))
            .await
    }
}

pub fn project_body(slug: &str) -> Value {
    json!({
        "title": format!("Project {slug}"),
        "slug": slug,
        "description": "A portfolio project"
    })
}

/// Multipart body with a single `image` field.
pub fn multipart_image(file_name: &str, content_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "folio-test-boundary";
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
