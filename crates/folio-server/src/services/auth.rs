//! Registration, login and logout.

use super::identity::{IdentityResolver, ResolveError};
use crate::domain::{Identity, NewIdentity};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{AuthUser, CredentialIssuer, CredentialValidator, IssuedCredential};
use crate::request::{LoginRequest, RegisterRequest};
use crate::store::{AuthProvider, ProfileRepository};
use std::sync::Arc;
use tracing::{info, warn};

/// Account flows on top of the auth provider and the profile table.
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileRepository>,
    resolver: IdentityResolver,
    issuer: Arc<CredentialIssuer>,
    validator: Arc<CredentialValidator>,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileRepository>,
        resolver: IdentityResolver,
        issuer: Arc<CredentialIssuer>,
        validator: Arc<CredentialValidator>,
    ) -> Self {
        Self {
            provider,
            profiles,
            resolver,
            issuer,
            validator,
        }
    }

    /// Create the account and its profile, then sign the caller in.
    ///
    /// A duplicate email surfaces as a conflict from the provider's
    /// uniqueness constraint.
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<(Identity, IssuedCredential)> {
        let id = self
            .provider
            .sign_up(&req.email, &req.password, &req.name)
            .await?;

        let identity = self
            .profiles
            .insert(NewIdentity::registered(id, req.email, req.name))
            .await?;
        let credential = self.issuer.issue(identity.id)?;

        info!(user_id = %identity.id, "account registered");
        Ok((identity, credential))
    }

    pub async fn login(&self, req: LoginRequest) -> ApiResult<(Identity, IssuedCredential)> {
        let id = self.provider.sign_in(&req.email, &req.password).await?;

        let identity = match self.resolver.resolve(&id.to_string()).await {
            Ok(identity) => identity,
            Err(ResolveError::NotFound) => {
                warn!(user_id = %id, "account has no profile");
                return Err(ApiError::NotFound("User profile".into()));
            }
            Err(err) => return Err(err.into()),
        };
        let credential = self.issuer.issue(identity.id)?;

        info!(user_id = %identity.id, "login succeeded");
        Ok((identity, credential))
    }

    /// Returns whether the credential was put on the deny-list. Without one
    /// the credential stays valid until it expires.
    pub fn logout(&self, user: &AuthUser) -> bool {
        let revoked = self.validator.revoke(user);
        info!(user_id = %user.id, revoked, "logout");
        revoked
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}
