//! Gateway services sitting between the handlers and the store ports.

pub mod auth;
pub mod identity;
pub mod projects;
pub mod uploads;

pub use auth::AuthService;
pub use identity::{IdentityResolver, ResolveError};
pub use projects::ProjectService;
pub use uploads::{ImageBuffer, UploadService, MAX_IMAGE_BYTES};
