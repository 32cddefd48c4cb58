//! Authorization audit logging.

use super::types::{Action, Decision};
use crate::domain::{Identity, Ownership};
use folio_common_core::{ProjectId, Timestamp, UserId};
use serde::Serialize;
use tracing::{info, warn};

/// Authorization audit event.
#[derive(Debug, Serialize)]
pub struct AuthzAuditEvent {
    pub timestamp: Timestamp,
    pub user_id: Option<UserId>,
    pub action: &'static str,
    pub resource_id: Option<ProjectId>,
    pub granted: bool,
    pub reason: Option<String>,
}

impl AuthzAuditEvent {
    pub fn new(
        identity: Option<&Identity>,
        action: Action,
        resource: Option<&Ownership>,
        decision: Decision,
    ) -> Self {
        Self {
            timestamp: Timestamp::now(),
            user_id: identity.map(|i| i.id),
            action: action.as_str(),
            resource_id: resource.map(|r| r.project_id),
            granted: decision.is_allowed(),
            reason: match decision {
                Decision::Allow => None,
                Decision::Deny(reason) => Some(reason.to_string()),
            },
        }
    }

    pub fn log(&self) {
        if self.granted {
            info!(
                event = "authz_granted",
                user_id = ?self.user_id,
                action = self.action,
                resource_id = ?self.resource_id,
                "Authorization granted"
            );
        } else {
            warn!(
                event = "authz_denied",
                user_id = ?self.user_id,
                action = self.action,
                resource_id = ?self.resource_id,
                reason = ?self.reason,
                "Authorization denied"
            );
        }
    }
}

/// Log authorization decision.
pub fn log_authz(
    identity: Option<&Identity>,
    action: Action,
    resource: Option<&Ownership>,
    decision: Decision,
) {
    AuthzAuditEvent::new(identity, action, resource, decision).log();
}
