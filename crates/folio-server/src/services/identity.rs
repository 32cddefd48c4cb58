//! Identity resolution.

use crate::domain::Identity;
use crate::store::{ProfileRepository, StoreError};
use folio_common_core::UserId;
use std::sync::Arc;
use tracing::debug;

/// Failure to resolve an identity reference.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Absent or malformed id; the two are indistinguishable to callers.
    #[error("identity not found")]
    NotFound,

    #[error("profile lookup failed: {0}")]
    Upstream(#[source] StoreError),
}

/// Maps an identity reference to its stored profile.
#[derive(Clone)]
pub struct IdentityResolver {
    profiles: Arc<dyn ProfileRepository>,
}

impl IdentityResolver {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn resolve(&self, reference: &str) -> Result<Identity, ResolveError> {
        let Ok(id) = UserId::parse(reference) else {
            debug!("malformed identity reference");
            return Err(ResolveError::NotFound);
        };

        match self.profiles.find_by_id(id).await {
            Ok(Some(identity)) => Ok(identity),
            Ok(None) | Err(StoreError::NotFound) => Err(ResolveError::NotFound),
            Err(err) => Err(ResolveError::Upstream(err)),
        }
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}
