//! Middleware for the Folio API server.

pub mod auth;
pub mod authz;
pub mod cors;

pub use auth::{Auth, AuthLayer, AuthMiddleware, AuthUser, CurrentIdentity};
pub use authz::{authorize, check_resource_access, AccessPolicy, Action, Decision};
pub use cors::{CorsBuilder, CorsConfig, CorsLayer, CorsMiddleware};
