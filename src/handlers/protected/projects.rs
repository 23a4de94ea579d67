// handlers/protected/projects.rs - /api/projects/ collection and item handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::api::format::{project_views, ProjectView};
use crate::api::payload::ProjectPayload;
use crate::database::models::Project;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::utils::{not_found, record_id};

/// GET /api/projects/ - the caller's projects, each with its tasks
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<ProjectView>> {
    let projects = state.store.list_projects(user.id).await?;
    let ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
    let tasks = state.store.tasks_for_projects(user.id, &ids).await?;

    Ok(ApiResponse::success(project_views(&projects, &user.username, tasks)))
}

/// POST /api/projects/ - the owner is always the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> ApiResult<ProjectView> {
    let Json(payload) = payload?;
    let new_project = payload.into_new()?;

    let project = state.store.create_project(user.id, new_project).await?;
    tracing::info!("User {} created project {}", user.username, project.id);

    Ok(ApiResponse::created(ProjectView::new(&project, &user.username, &[])))
}

/// GET /api/projects/:id/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ProjectView> {
    let id = record_id(id)?;
    let project = state.store.find_project(user.id, id).await?.ok_or_else(not_found)?;

    Ok(ApiResponse::success(render(&state, &user, &project).await?))
}

/// PUT /api/projects/:id/ - full update, `title` required
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> ApiResult<ProjectView> {
    apply_update(state, user, id, payload, false).await
}

/// PATCH /api/projects/:id/ - partial update
pub async fn partial_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> ApiResult<ProjectView> {
    apply_update(state, user, id, payload, true).await
}

/// DELETE /api/projects/:id/ - removes the project and all of its tasks
pub async fn destroy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = record_id(id)?;
    if !state.store.delete_project(user.id, id).await? {
        return Err(not_found());
    }

    tracing::info!("User {} deleted project {}", user.username, id);
    Ok(ApiResponse::no_content())
}

async fn apply_update(
    state: AppState,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
    partial: bool,
) -> ApiResult<ProjectView> {
    let id = record_id(id)?;
    // Unknown ids answer 404 before the body is looked at
    state.store.find_project(user.id, id).await?.ok_or_else(not_found)?;

    let Json(payload) = payload?;
    let changes = payload.into_changes(partial)?;

    let project = state
        .store
        .update_project(user.id, id, changes)
        .await?
        .ok_or_else(not_found)?;

    Ok(ApiResponse::success(render(&state, &user, &project).await?))
}

async fn render(state: &AppState, user: &AuthUser, project: &Project) -> Result<ProjectView, ApiError> {
    let tasks = state.store.tasks_for_projects(user.id, &[project.id]).await?;
    Ok(ProjectView::new(project, &user.username, &tasks))
}
