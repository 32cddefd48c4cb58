//! Ownership and role checks for project operations.

pub mod audit;
pub mod resource;
pub mod types;

pub use audit::{log_authz, AuthzAuditEvent};
pub use resource::{authorize, check_resource_access, AccessPolicy};
pub use types::{Action, Decision, DenyReason};
