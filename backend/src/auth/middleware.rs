//! Middleware for protecting authenticated routes and handling authorization.
//!
//! Validates bearer tokens against the staff table and attaches the caller
//! to the request; a second layer enforces the admin role where required.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::errors::ApiError;
use crate::AppState;

use super::errors::AuthError;
use super::models::{CurrentUser, Role};
use super::service;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or(AuthError::MissingToken)?;
    let user = service::user_for_token(&state.pool, token)
        .await?
        .ok_or(AuthError::InvalidToken)?;
    request.extensions_mut().insert(CurrentUser::from(&user));
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingToken)?;
    if current.role != Role::Admin {
        return Err(AuthError::AdminRequired.into());
    }
    Ok(next.run(request).await)
}
