//! Image uploads to the public bucket.

use crate::error::{ApiError, ApiResult};
use crate::store::{ImageStorage, StoredImage};
use bytes::{Bytes, BytesMut};
use folio_common_core::{Timestamp, UserId};
use std::sync::Arc;
use tracing::info;

/// Largest accepted image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const MAX_NAME_LEN: usize = 100;

/// Accumulates an upload, failing as soon as it grows past the limit.
#[derive(Debug)]
pub struct ImageBuffer {
    buf: BytesMut,
    limit: usize,
}

impl ImageBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            limit,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> ApiResult<()> {
        if self.buf.len() + chunk.len() > self.limit {
            return Err(file_too_large(self.limit));
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

pub(crate) fn file_too_large(limit: usize) -> ApiError {
    ApiError::FileTooLarge {
        limit_mb: limit / (1024 * 1024),
    }
}

#[derive(Clone)]
pub struct UploadService {
    images: Arc<dyn ImageStorage>,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(images: Arc<dyn ImageStorage>) -> Self {
        Self {
            images,
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// A fresh buffer bounded by the upload limit.
    pub fn buffer(&self) -> ImageBuffer {
        ImageBuffer::new(self.max_bytes)
    }

    /// Only `image/*` types are accepted.
    pub fn check_content_type(&self, content_type: Option<&str>) -> ApiResult<String> {
        match content_type {
            Some(ct) if ct.starts_with("image/") && ct.len() > "image/".len() => Ok(ct.to_string()),
            Some(ct) => Err(ApiError::UnsupportedMediaType(ct.to_string())),
            None => Err(ApiError::UnsupportedMediaType("missing content type".into())),
        }
    }

    pub async fn upload(
        &self,
        owner: UserId,
        file_name: Option<&str>,
        content_type: &str,
        bytes: Bytes,
    ) -> ApiResult<StoredImage> {
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("image file is empty".into()));
        }
        if bytes.len() > self.max_bytes {
            return Err(file_too_large(self.max_bytes));
        }

        let path = object_path(owner, Timestamp::now(), file_name);
        let stored = self.images.upload(owner, &path, bytes, content_type).await?;
        info!(user_id = %owner, path = %stored.path, "image uploaded");
        Ok(stored)
    }

    /// Callers may only remove objects under their own prefix.
    pub async fn remove(&self, owner: UserId, path: &str) -> ApiResult<()> {
        if !owns_path(owner, path) {
            return Err(ApiError::ResourceAccessDenied("not owner".into()));
        }
        self.images.remove(owner, path).await?;
        info!(user_id = %owner, path = %path, "image removed");
        Ok(())
    }
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

fn object_path(owner: UserId, at: Timestamp, file_name: Option<&str>) -> String {
    format!(
        "{owner}/{}-{}",
        at.unix_millis(),
        sanitize_file_name(file_name.unwrap_or_default())
    )
}

fn sanitize_file_name(name: &str) -> String {
    // Strip any client-side directory part.
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches(['.', '-']);

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

fn owns_path(owner: UserId, path: &str) -> bool {
    let prefix = format!("{owner}/");
    path.strip_prefix(&prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.split('/').any(|part| part == ".." || part.is_empty()))
}
