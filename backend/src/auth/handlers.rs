//! Handler functions for staff account management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ApiError;
use crate::AppState;

use super::models::{CreateStaffUser, CreatedStaffUser, StaffUser};
use super::service;

pub async fn list_staff(State(state): State<AppState>) -> Result<Json<Vec<StaffUser>>, ApiError> {
    let staff = sqlx::query_as::<_, StaffUser>("SELECT * FROM staff_users ORDER BY username")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(staff))
}

pub async fn create_staff(
    State(state): State<AppState>,
    Json(body): Json<CreateStaffUser>,
) -> Result<(StatusCode, Json<CreatedStaffUser>), ApiError> {
    body.validate()?;
    let user = service::create_staff_user(&state.pool, &body).await?;
    let api_token = user.api_token.clone();
    Ok((
        StatusCode::CREATED,
        Json(CreatedStaffUser { user, api_token }),
    ))
}

pub async fn deactivate_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StaffUser>, ApiError> {
    let user = sqlx::query_as::<_, StaffUser>(
        "UPDATE staff_users SET is_active = 0, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound("staff user"))?;
    Ok(Json(user))
}

pub async fn rotate_staff_token(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CreatedStaffUser>, ApiError> {
    let user = service::rotate_token(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("staff user"))?;
    let api_token = user.api_token.clone();
    Ok(Json(CreatedStaffUser { user, api_token }))
}
