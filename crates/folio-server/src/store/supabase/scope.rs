//! Short-lived row-API tokens scoped to the acting user.
//!
//! Writes carry a token signed with the project's own JWT secret, so
//! `auth.uid()` inside the row-level security policies is the caller the
//! gateway just authorized, not the shared anon key.

use crate::store::error::{StoreError, StoreResult};
use folio_common_core::{Timestamp, UserId};
use folio_common_secret::SecretString;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Role and audience the hosted project grants signed-in users.
pub const AUTHENTICATED: &str = "authenticated";

/// Seconds a scoped token stays valid; one write sequence fits well inside.
pub const SCOPED_TOKEN_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct ScopedClaims {
    pub sub: String,
    pub role: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs tokens the row API accepts as a given user.
#[derive(Clone)]
pub struct RowSigner {
    key: EncodingKey,
}

impl RowSigner {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.expose().as_bytes()),
        }
    }

    pub fn token_for(&self, actor: UserId) -> StoreResult<String> {
        let now = Timestamp::now().unix();
        let claims = ScopedClaims {
            sub: actor.to_string(),
            role: AUTHENTICATED.to_string(),
            aud: AUTHENTICATED.to_string(),
            iat: now,
            exp: now + SCOPED_TOKEN_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.key).map_err(StoreError::upstream)
    }
}

impl std::fmt::Debug for RowSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowSigner").finish_non_exhaustive()
    }
}
