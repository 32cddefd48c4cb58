//! Response bodies.
//!
//! Success bodies are the bare JSON value; failures use the envelope rendered
//! by [`crate::error::ApiError`].

pub mod types;

pub use types::{AuthResponse, HealthResponse, HealthStatus, MessageResponse, StoreReach};
