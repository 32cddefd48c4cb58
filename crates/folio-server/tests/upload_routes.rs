mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{multipart_image, TestApp, TestResponse};
use serde_json::json;

async fn upload(app: &TestApp, token: Option<&str>, content_type: &str, bytes: &[u8]) -> TestResponse {
    let (multipart_type, body) = multipart_image("photo.png", content_type, bytes);
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/upload/image")
        .header(header::CONTENT_TYPE, multipart_type);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    app.send(builder.body(Body::from(body)).unwrap()).await
}

#[tokio::test]
async fn test_upload_and_delete_own_image() {
    let app = TestApp::new();
    let account = app.register("a@x.com", "Ann").await;

    let uploaded = upload(&app, Some(&account.token), "image/png", b"\x89PNG fake").await;
    assert_eq!(uploaded.status, StatusCode::OK, "{:?}", uploaded.body);

    let path = uploaded.body["path"].as_str().unwrap().to_string();
    assert!(path.starts_with(&format!("{}/", account.id)));
    assert!(path.ends_with("-photo.png"));
    assert!(uploaded.body["url"].as_str().unwrap().ends_with(&path));
    assert_eq!(app.backend.object(&path), Some((9, "image/png".to_string())));

    let deleted = app
        .request(
            Method::DELETE,
            "/api/upload/image",
            Some(&account.token),
            Some(json!({"path": path})),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(app.backend.object(&path).is_none());
}

#[tokio::test]
async fn test_oversized_file_rejected_before_storage() {
    let app = TestApp::new();
    let account = app.register("a@x.com", "Ann").await;
    let six_mb = vec![0u8; 6 * 1024 * 1024];

    let response = upload(&app, Some(&account.token), "image/png", &six_mb).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "file_too_large");
    assert_eq!(app.backend.storage_calls(), 0);
}

#[tokio::test]
async fn test_non_image_rejected() {
    let app = TestApp::new();
    let account = app.register("a@x.com", "Ann").await;

    let response = upload(&app, Some(&account.token), "text/plain", b"hello").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "unsupported_media_type");
    assert_eq!(app.backend.storage_calls(), 0);
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let app = TestApp::new();

    let response = upload(&app, None, "image/png", b"png").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cannot_delete_someone_elses_image() {
    let app = TestApp::new();
    let owner = app.register("a@x.com", "Ann").await;
    let other = app.register("b@x.com", "Bob").await;

    let uploaded = upload(&app, Some(&owner.token), "image/jpeg", b"jpeg").await;
    let path = uploaded.body["path"].as_str().unwrap().to_string();

    let denied = app
        .request(
            Method::DELETE,
            "/api/upload/image",
            Some(&other.token),
            Some(json!({"path": path})),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert!(app.backend.object(&path).is_some());

    let empty = app
        .request(
            Method::DELETE,
            "/api/upload/image",
            Some(&owner.token),
            Some(json!({"path": ""})),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}
