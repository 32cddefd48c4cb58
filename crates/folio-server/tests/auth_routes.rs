mod common;

use axum::http::{Method, StatusCode};
use common::{test_config, TestApp, SECRET};
use folio_common_core::{Timestamp, UserId};
use folio_common_secret::SecretString;
use folio_server::middleware::auth::CredentialIssuer;
use folio_server::store::MemoryBackend;
use serde_json::json;

#[tokio::test]
async fn test_register_then_login_resolves_same_identity() {
    let app = TestApp::new();

    let register = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "a@x.com", "password": "secret1", "name": "Ann"})),
        )
        .await;
    assert_eq!(register.status, StatusCode::CREATED);
    assert_eq!(register.body["email"], "a@x.com");
    assert_eq!(register.body["name"], "Ann");
    assert_eq!(register.body["role"], "user");

    let login = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["id"], register.body["id"]);

    let token = login.body["token"].as_str().unwrap();
    let me = app.request(Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "a@x.com");
    assert!(me.body["avatar_url"]
        .as_str()
        .unwrap()
        .starts_with("https://ui-avatars.com/api/"));
    assert!(me.body.get("password").is_none());
}

#[tokio::test]
async fn test_register_validation_and_unknown_fields() {
    let app = TestApp::new();

    let missing = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "a@x.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["success"], false);

    let short = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "a@x.com", "password": "123", "name": "Ann"})),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert!(short.body["error"]["fields"]["password"].is_array());

    let extra = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "a@x.com", "password": "secret1", "name": "Ann", "role": "admin"})),
        )
        .await;
    assert_eq!(extra.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    app.register("a@x.com", "Ann").await;

    let again = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "a@x.com", "password": "secret1", "name": "Ann"})),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new();
    app.register("a@x.com", "Ann").await;

    let wrong = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "nope"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"]["code"], "invalid_credentials");

    let empty = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "", "password": ""})),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unconfirmed_email_rejected_until_confirmed() {
    let app = TestApp::with_backend(test_config(), MemoryBackend::new().with_email_confirmation());
    app.register("a@x.com", "Ann").await;
    let body = json!({"email": "a@x.com", "password": "secret1"});

    let before = app
        .request(Method::POST, "/api/auth/login", None, Some(body.clone()))
        .await;
    assert_eq!(before.status, StatusCode::UNAUTHORIZED);
    assert_eq!(before.body["error"]["code"], "email_not_confirmed");

    assert!(app.backend.confirm_email("a@x.com"));
    let after = app
        .request(Method::POST, "/api/auth/login", None, Some(body))
        .await;
    assert_eq!(after.status, StatusCode::OK);
}

#[tokio::test]
async fn test_me_requires_valid_credential() {
    let app = TestApp::new();

    let missing = app.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request(Method::GET, "/api/auth/me", Some("not.a.token"), None)
        .await;
    assert_eq!(garbage.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_credential_is_unauthorized() {
    let app = TestApp::new();
    let account = app.register("a@x.com", "Ann").await;

    let issuer = CredentialIssuer::new(&SecretString::from(SECRET));
    let issued_at = Timestamp::from_unix(Timestamp::now().unix() - 31 * 24 * 3600).unwrap();
    let stale = issuer.issue_at(account.id, issued_at).unwrap();

    let response = app
        .request(Method::GET, "/api/auth/me", Some(&stale.token), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["code"], "token_expired");
}

#[tokio::test]
async fn test_me_for_unknown_identity_is_not_found() {
    let app = TestApp::new();
    let issuer = CredentialIssuer::new(&SecretString::from(SECRET));
    let orphan = issuer.issue(UserId::new()).unwrap();

    let response = app
        .request(Method::GET, "/api/auth/me", Some(&orphan.token), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_without_revocation_keeps_token_valid() {
    let app = TestApp::new();
    let account = app.register("a@x.com", "Ann").await;

    let logout = app
        .request(Method::POST, "/api/auth/logout", Some(&account.token), None)
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert!(logout.body["message"].is_string());

    let me = app
        .request(Method::GET, "/api/auth/me", Some(&account.token), None)
        .await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_with_revocation_rejects_token() {
    let mut config = test_config();
    config.auth.revoke_on_logout = true;
    let app = TestApp::with_config(config);
    let account = app.register("a@x.com", "Ann").await;

    let logout = app
        .request(Method::POST, "/api/auth/logout", Some(&account.token), None)
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let me = app
        .request(Method::GET, "/api/auth/me", Some(&account.token), None)
        .await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.body["error"]["code"], "token_revoked");
}

#[tokio::test]
async fn test_unknown_route_and_health() {
    let app = TestApp::new();

    let missing = app.get("/api/nowhere").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"]["path"], "/api/nowhere");

    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
    assert_eq!(health.body["database"], "connected");
}
