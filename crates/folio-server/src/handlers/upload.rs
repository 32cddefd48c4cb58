//! Image upload endpoints.

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::Auth;
use crate::request::{DeleteImageRequest, ValidatedJson};
use crate::response::MessageResponse;
use crate::state::AppState;
use crate::store::StoredImage;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

/// Multipart field carrying the file.
pub const IMAGE_FIELD: &str = "image";

/// Streams the `image` field into a bounded buffer. The size and type checks
/// run before anything reaches the bucket.
pub async fn upload_image(
    State(state): State<AppState>,
    Auth(user): Auth,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<StoredImage>> {
    let mut multipart = multipart?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = state.uploads.check_content_type(field.content_type())?;
        let file_name = field.file_name().map(str::to_owned);

        let mut buffer = state.uploads.buffer();
        while let Some(chunk) = field.chunk().await? {
            buffer.push(&chunk)?;
        }

        let stored = state
            .uploads
            .upload(user.id, file_name.as_deref(), &content_type, buffer.finish())
            .await?;
        return Ok(Json(stored));
    }

    Err(ApiError::BadRequest(format!(
        "multipart field `{IMAGE_FIELD}` is required"
    )))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidatedJson(req): ValidatedJson<DeleteImageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.uploads.remove(user.id, &req.path).await?;
    Ok(Json(MessageResponse::new("Image deleted")))
}
