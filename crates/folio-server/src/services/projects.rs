//! Project access facade.
//!
//! Every mutation re-reads the project's owner right before authorizing, then
//! writes as the caller. The two calls are not transactional, so ownership can
//! change in between; the hosted store's row-level security applies the same
//! owner and admin rules to the write itself.

use crate::domain::{Identity, NewProject, Project, ProjectChanges, ProjectFilter};
use crate::error::{ApiError, ApiResult, ErrorContext};
use crate::middleware::authz::{check_resource_access, Action};
use crate::store::{ProjectRepository, StoreError};
use folio_common_core::ProjectId;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectRepository>) -> Self {
        Self { projects }
    }

    /// Newest first. Both filters apply together.
    pub async fn list(&self, filter: &ProjectFilter) -> ApiResult<Vec<Project>> {
        Ok(self.projects.list(filter).await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> ApiResult<Project> {
        self.projects.find_by_slug(slug).await?.not_found("Project")
    }

    pub async fn create(&self, caller: &Identity, project: NewProject) -> ApiResult<Project> {
        check_resource_access(Some(caller), None, Action::Create)?;

        let created = self.projects.insert(caller.id, project).await?;
        info!(project_id = %created.id, slug = %created.slug, user_id = %caller.id, "project created");
        Ok(created)
    }

    pub async fn update(
        &self,
        caller: &Identity,
        id: ProjectId,
        changes: ProjectChanges,
    ) -> ApiResult<Project> {
        let current = self.current(id).await?;
        check_resource_access(Some(caller), Some(&current.ownership()), Action::Update)?;

        let updated = self
            .projects
            .update(caller.id, id, changes)
            .await
            .map_err(missing_project)?;
        info!(project_id = %id, user_id = %caller.id, "project updated");
        Ok(updated)
    }

    /// A second delete of the same id finds nothing and reports not found.
    pub async fn delete(&self, caller: &Identity, id: ProjectId) -> ApiResult<()> {
        let current = self.current(id).await?;
        check_resource_access(Some(caller), Some(&current.ownership()), Action::Delete)?;

        if !self.projects.delete(caller.id, id).await.map_err(missing_project)? {
            return Err(ApiError::NotFound("Project".into()));
        }
        info!(project_id = %id, user_id = %caller.id, "project deleted");
        Ok(())
    }

    async fn current(&self, id: ProjectId) -> ApiResult<Project> {
        self.projects.find_by_id(id).await?.not_found("Project")
    }
}

fn missing_project(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::NotFound("Project".into()),
        other => other.into(),
    }
}

impl std::fmt::Debug for ProjectService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectService").finish_non_exhaustive()
    }
}
