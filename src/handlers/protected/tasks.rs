// handlers/protected/tasks.rs - /api/tasks/ collection and item handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::api::format::TaskView;
use crate::api::payload::TaskPayload;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::utils::{not_found, record_id};

/// GET /api/tasks/ - tasks across all of the caller's projects
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<TaskView>> {
    let tasks = state.store.list_tasks(user.id).await?;
    Ok(ApiResponse::success(tasks.iter().map(TaskView::from).collect()))
}

/// POST /api/tasks/ - `project` must name one of the caller's projects
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> ApiResult<TaskView> {
    let Json(payload) = payload?;
    let new_task = payload.into_new()?;
    let project_id = new_task.project_id;

    let Some(task) = state.store.create_task(user.id, new_task).await? else {
        tracing::warn!("User {} tried to add a task to project {}", user.username, project_id);
        return Err(ApiError::field(
            "project",
            format!("Invalid pk \"{}\" - object does not exist.", project_id),
        ));
    };

    tracing::info!("User {} created task {} in project {}", user.username, task.id, project_id);
    Ok(ApiResponse::created(TaskView::from(&task)))
}

/// GET /api/tasks/:id/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<TaskView> {
    let id = record_id(id)?;
    let task = state.store.find_task(user.id, id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(TaskView::from(&task)))
}

/// PUT /api/tasks/:id/ - full update, `title` required
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> ApiResult<TaskView> {
    apply_update(state, user, id, payload, false).await
}

/// PATCH /api/tasks/:id/ - partial update
pub async fn partial_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> ApiResult<TaskView> {
    apply_update(state, user, id, payload, true).await
}

/// DELETE /api/tasks/:id/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = record_id(id)?;
    if !state.store.delete_task(user.id, id).await? {
        return Err(not_found());
    }

    tracing::info!("User {} deleted task {}", user.username, id);
    Ok(ApiResponse::no_content())
}

async fn apply_update(
    state: AppState,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
    partial: bool,
) -> ApiResult<TaskView> {
    let id = record_id(id)?;
    state.store.find_task(user.id, id).await?.ok_or_else(not_found)?;

    let Json(payload) = payload?;
    let changes = payload.into_changes(partial)?;

    let task = state
        .store
        .update_task(user.id, id, changes)
        .await?
        .ok_or_else(not_found)?;

    Ok(ApiResponse::success(TaskView::from(&task)))
}
