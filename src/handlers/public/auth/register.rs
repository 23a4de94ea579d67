// handlers/public/auth/register.rs - POST /api/register/ handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::format::UserView;
use crate::api::payload::RegisterPayload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AccountService;
use crate::state::AppState;

/// POST /api/register/ - create a new account
///
/// Body: `{ "username": "...", "email": "...", "password": "..." }` with
/// `email` optional. Answers 201 with `{ "username", "email" }`; the password
/// is never echoed back.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> ApiResult<UserView> {
    let Json(payload) = payload?;
    let registration = payload.validate()?;

    let accounts = AccountService::new(state.store.clone(), state.config.security.bcrypt_cost);
    let user = accounts.register(registration).await?;

    Ok(ApiResponse::created(UserView::from(&user)))
}
