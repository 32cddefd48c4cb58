//! Response payload types.

use crate::domain::{Identity, Role};
use crate::middleware::auth::IssuedCredential;
use folio_common_core::{Timestamp, UserId};
use serde::Serialize;

/// Body returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

impl AuthResponse {
    pub fn new(identity: Identity, credential: IssuedCredential) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            role: identity.role,
            token: credential.token,
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Overall health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

/// Result of probing the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreReach {
    Connected,
    Unreachable,
}

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: String,
    pub version: &'static str,
    pub database: StoreReach,
}

impl HealthResponse {
    pub fn from_store(database: StoreReach) -> Self {
        let status = match database {
            StoreReach::Connected => HealthStatus::Ok,
            StoreReach::Unreachable => HealthStatus::Degraded,
        };
        Self {
            status,
            timestamp: Timestamp::now().to_iso8601(),
            version: env!("CARGO_PKG_VERSION"),
            database,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}
