// handlers/public/auth/token.rs - token obtain and refresh handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use crate::api::payload::{TokenObtainPayload, TokenRefreshPayload};
use crate::auth::TokenPair;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AccountService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// POST /api/token/ - exchange username and password for an access/refresh pair
pub async fn token_post(
    State(state): State<AppState>,
    payload: Result<Json<TokenObtainPayload>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(payload) = payload?;
    let (username, password) = payload.validate()?;

    let accounts = AccountService::new(state.store.clone(), state.config.security.bcrypt_cost);
    let user = accounts.authenticate(&username, &password).await?;
    let pair = state.tokens.issue_pair(&user)?;

    tracing::info!("Issued tokens for user {}", user.username);
    Ok(ApiResponse::success(pair))
}

/// POST /api/token/refresh/ - trade a refresh token for a new access token
pub async fn refresh_post(
    State(state): State<AppState>,
    payload: Result<Json<TokenRefreshPayload>, JsonRejection>,
) -> ApiResult<AccessToken> {
    let Json(payload) = payload?;
    let refresh = payload.validate()?;

    let access = state.tokens.refresh(&refresh).map_err(|e| {
        tracing::warn!("Refresh rejected: {}", e);
        ApiError::from(e)
    })?;

    Ok(ApiResponse::success(AccessToken { access }))
}
