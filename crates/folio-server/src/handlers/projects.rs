//! Project endpoints.

use crate::domain::Project;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::CurrentIdentity;
use crate::request::{
    ApiQuery, CreateProjectRequest, ListProjectsQuery, UpdateProjectRequest, ValidatedJson,
};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use folio_common_core::ProjectId;

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListProjectsQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state.projects.list(&query.into_filter()).await?;
    Ok(Json(projects))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.projects.get_by_slug(&slug).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    ValidatedJson(req): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.projects.create(&caller, req.into_new_project()?).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let id = project_id(&id)?;
    let project = state
        .projects
        .update(&caller, id, req.into_changes()?)
        .await?;
    Ok(Json(project))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.projects.delete(&caller, project_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

// A malformed id can name no project.
fn project_id(raw: &str) -> ApiResult<ProjectId> {
    ProjectId::parse(raw).map_err(|_| ApiError::NotFound("Project".into()))
}
