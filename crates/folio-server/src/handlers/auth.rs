//! Account endpoints.

use crate::domain::Identity;
use crate::error::ApiResult;
use crate::middleware::auth::{Auth, CurrentIdentity};
use crate::request::{LoginRequest, RegisterRequest, ValidatedJson};
use crate::response::{AuthResponse, MessageResponse};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (identity, credential) = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(identity, credential))))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (identity, credential) = state.auth.login(req).await?;
    Ok(Json(AuthResponse::new(identity, credential)))
}

/// The caller's profile. [`Identity`] carries no password material.
pub async fn me(CurrentIdentity(identity): CurrentIdentity) -> Json<Identity> {
    Json(identity)
}

pub async fn logout(State(state): State<AppState>, Auth(user): Auth) -> Json<MessageResponse> {
    let message = if state.auth.logout(&user) {
        "Logged out"
    } else {
        "Logged out; discard the token on the client"
    };
    Json(MessageResponse::new(message))
}
