//! Error handling for the Folio API server.

pub mod context;
pub mod response;
pub mod types;

pub use context::ErrorContext;
pub use types::{ApiError, ApiResult};
