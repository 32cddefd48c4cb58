//! Resource-level authorization.

use super::audit::log_authz;
use super::types::{Action, Decision, DenyReason};
use crate::domain::{Identity, Ownership};
use crate::error::ApiError;

/// Policy for resource access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Owner only, whatever the role.
    OwnerOnly,
    /// Owner or admin.
    OwnerOrAdmin,
    /// Any authenticated identity.
    Authenticated,
    /// Public (no auth required).
    Public,
}

impl AccessPolicy {
    /// The policy guarding `action` on projects.
    pub fn for_action(action: Action) -> Self {
        match action {
            Action::Read => Self::Public,
            Action::Create => Self::Authenticated,
            Action::Update => Self::OwnerOnly,
            Action::Delete => Self::OwnerOrAdmin,
        }
    }

    pub fn check(&self, identity: Option<&Identity>, resource: Option<&Ownership>) -> Decision {
        let identity = match (self, identity) {
            (Self::Public, _) => return Decision::Allow,
            (_, None) => return Decision::Deny(DenyReason::Unauthenticated),
            (_, Some(identity)) => identity,
        };
        let is_owner = resource.is_some_and(|r| r.owner == identity.id);

        match self {
            Self::Public | Self::Authenticated => Decision::Allow,
            Self::OwnerOnly if is_owner => Decision::Allow,
            Self::OwnerOnly => Decision::Deny(DenyReason::NotOwner),
            Self::OwnerOrAdmin if is_owner || identity.role.is_admin() => Decision::Allow,
            Self::OwnerOrAdmin => Decision::Deny(DenyReason::NotOwnerOrAdmin),
        }
    }
}

/// Decide `action` for `identity` on `resource` and audit the decision.
///
/// `resource` must carry ownership fetched right before the call.
pub fn authorize(
    identity: Option<&Identity>,
    resource: Option<&Ownership>,
    action: Action,
) -> Decision {
    let decision = AccessPolicy::for_action(action).check(identity, resource);
    log_authz(identity, action, resource, decision);
    decision
}

/// [`authorize`], turning a denial into the matching API error.
pub fn check_resource_access(
    identity: Option<&Identity>,
    resource: Option<&Ownership>,
    action: Action,
) -> Result<(), ApiError> {
    match authorize(identity, resource, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(DenyReason::Unauthenticated) => Err(ApiError::Unauthorized),
        Decision::Deny(reason) => Err(ApiError::ResourceAccessDenied(reason.to_string())),
    }
}
