use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, TokenType};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, injected into request extensions by
/// [`jwt_auth_middleware`]
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// JWT authentication middleware: validates the bearer access token and
/// confirms its user still exists before the request reaches a handler
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|e| {
        tracing::debug!("Missing or malformed Authorization header: {}", e);
        ApiError::from(e)
    })?;

    let claims = state.tokens.verify(token, TokenType::Access).map_err(|e| {
        tracing::warn!("Bearer token rejected: {}", e);
        ApiError::from(e)
    })?;

    let user = state.store.find_user_by_id(claims.user_id).await?.ok_or_else(|| {
        tracing::warn!("Token for unknown user id {}", claims.user_id);
        ApiError::from(AuthError::UnknownUser)
    })?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}
