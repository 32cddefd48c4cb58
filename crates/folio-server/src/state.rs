//! Shared application state.

use crate::config::ServerConfig;
use crate::middleware::auth::{AuthLayer, CredentialIssuer, CredentialValidator, RevocationList};
use crate::services::{AuthService, IdentityResolver, ProjectService, UploadService};
use crate::store::Store;
use std::sync::Arc;

/// Everything a handler needs, built once at start-up.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Store,
    pub validator: Arc<CredentialValidator>,
    pub resolver: IdentityResolver,
    pub auth: AuthService,
    pub projects: ProjectService,
    pub uploads: UploadService,
}

impl AppState {
    /// Build the state with the backend the configuration selects.
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.backend)?;
        Ok(Self::with_store(config.clone(), store))
    }

    /// Build the state around an existing store.
    pub fn with_store(config: ServerConfig, store: Store) -> Self {
        let issuer = Arc::new(CredentialIssuer::new(&config.auth.jwt_secret));
        let mut validator = CredentialValidator::new(&config.auth.jwt_secret);
        if config.auth.revoke_on_logout {
            validator = validator.with_revocation(Arc::new(RevocationList::new()));
        }
        let validator = Arc::new(validator);

        let resolver = IdentityResolver::new(store.profiles.clone());
        let auth = AuthService::new(
            store.auth.clone(),
            store.profiles.clone(),
            resolver.clone(),
            issuer,
            validator.clone(),
        );

        Self {
            config: Arc::new(config),
            projects: ProjectService::new(store.projects.clone()),
            uploads: UploadService::new(store.images.clone()),
            store,
            validator,
            resolver,
            auth,
        }
    }

    /// Layer guarding the protected routes.
    pub fn auth_layer(&self) -> AuthLayer {
        AuthLayer::new(self.validator.clone())
    }
}
