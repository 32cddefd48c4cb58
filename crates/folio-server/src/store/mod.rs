//! Persistence collaborator ports and their adapters.

pub mod error;
pub mod memory;
pub mod ports;
pub mod supabase;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryBackend;
pub use ports::{AuthProvider, ImageStorage, ProfileRepository, ProjectRepository, StoredImage};
pub use supabase::SupabaseClient;

use crate::config::{BackendConfig, BackendKind};
use std::sync::Arc;

/// The four ports, bound to one adapter.
#[derive(Clone)]
pub struct Store {
    pub auth: Arc<dyn AuthProvider>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub images: Arc<dyn ImageStorage>,
}

impl Store {
    /// Bind every port to the same adapter.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AuthProvider + ProfileRepository + ProjectRepository + ImageStorage + 'static,
    {
        Self {
            auth: backend.clone(),
            profiles: backend.clone(),
            projects: backend.clone(),
            images: backend,
        }
    }

    /// Build the adapter the configuration selects.
    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        match config.kind {
            BackendKind::Memory => Ok(Self::from_backend(Arc::new(
                MemoryBackend::new().with_technologies(&config.technologies),
            ))),
            BackendKind::Supabase => Ok(Self::from_backend(Arc::new(SupabaseClient::new(config)?))),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}
