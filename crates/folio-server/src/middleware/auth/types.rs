//! Authentication types.

use folio_common_core::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Session credential claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Credential ID (for revocation).
    pub jti: String,
}

impl Claims {
    /// Claims for `user_id`, valid from `issued_at` for `lifetime_secs`.
    pub fn new(user_id: UserId, issued_at: i64, lifetime_secs: i64) -> Self {
        Self {
            sub: user_id.to_string(),
            iat: issued_at,
            exp: issued_at + lifetime_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Get the subject as a user ID.
    pub fn user_id(&self) -> Option<UserId> {
        UserId::parse(&self.sub).ok()
    }

    /// Expired unless strictly before `exp`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

/// Authenticated caller, inserted into request extensions by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub jti: String,
    pub expires_at: Timestamp,
}

impl AuthUser {
    /// Create from validated claims.
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        Some(Self {
            id: claims.user_id()?,
            jti: claims.jti.clone(),
            expires_at: Timestamp::from_unix(claims.exp)?,
        })
    }
}
