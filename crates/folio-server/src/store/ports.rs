//! Ports the gateway talks to the persistence collaborator through.

use super::error::StoreResult;
use crate::domain::{Identity, NewIdentity, NewProject, Project, ProjectChanges, ProjectFilter};
use async_trait::async_trait;
use bytes::Bytes;
use folio_common_core::{ProjectId, UserId};
use serde::Serialize;

/// Account sign-up and password sign-in. Passwords never leave this port.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and return its id.
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> StoreResult<UserId>;

    /// Check a password and return the account id.
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<UserId>;
}

/// Profile rows.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>>;

    async fn insert(&self, profile: NewIdentity) -> StoreResult<Identity>;
}

/// Project rows with their tag links and images.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>>;

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Project>>;

    async fn find_by_id(&self, id: ProjectId) -> StoreResult<Option<Project>>;

    async fn insert(&self, owner: UserId, project: NewProject) -> StoreResult<Project>;

    /// Apply changes as `actor`; `NotFound` when the row vanished or the
    /// store no longer lets `actor` touch it.
    async fn update(
        &self,
        actor: UserId,
        id: ProjectId,
        changes: ProjectChanges,
    ) -> StoreResult<Project>;

    /// Remove the row as `actor`; `false` when nothing was deleted.
    async fn delete(&self, actor: UserId, id: ProjectId) -> StoreResult<bool>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> StoreResult<()>;
}

/// Where an uploaded object landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub url: String,
    pub path: String,
}

/// Public image bucket. Objects live under their owner's id.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn upload(
        &self,
        owner: UserId,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> StoreResult<StoredImage>;

    async fn remove(&self, owner: UserId, path: &str) -> StoreResult<()>;
}
