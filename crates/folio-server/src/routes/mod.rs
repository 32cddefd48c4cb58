//! Route configuration for the Folio API server.

use crate::{
    handlers::{auth, health, projects, upload},
    middleware::cors::{CorsConfig, CorsLayer},
    services::MAX_IMAGE_BYTES,
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Room for the multipart framing around a maximum-size image.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;

    // Common middleware stack applied to all routes
    let common_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(server.body_limit_bytes))
        .layer(TimeoutLayer::new(server.request_timeout()));

    let cors = CorsLayer::new(CorsConfig::from_settings(&state.config.cors));

    Router::new()
        .nest("/api", api_routes(&state))
        .route("/health", get(health::health))
        .fallback(fallback_handler)
        .layer(cors)
        .layer(common_middleware)
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_routes(state))
        .merge(project_routes(state))
        .merge(upload_routes(state))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route_layer(state.auth_layer());

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected)
}

// Reads are public; writes on the same paths carry the auth layer per handler.
fn project_routes(state: &AppState) -> Router<AppState> {
    let guard = state.auth_layer();

    Router::new()
        .route(
            "/projects",
            get(projects::list).post(projects::create.layer(guard.clone())),
        )
        .route(
            "/projects/:key",
            get(projects::get_by_slug)
                .put(projects::update.layer(guard.clone()))
                .delete(projects::delete.layer(guard)),
        )
}

fn upload_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/upload/image",
            post(upload::upload_image).delete(upload::delete_image),
        )
        .route_layer(state.auth_layer())
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + MULTIPART_OVERHEAD))
}

async fn fallback_handler(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "error": {
                "code": "not_found",
                "message": "The requested resource was not found",
                "path": uri.path(),
            }
        })),
    )
}
