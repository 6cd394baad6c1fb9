//! Staff account and token management.
//!
//! Tokens are opaque UUID-derived strings looked up directly in the
//! database; creating an account is the only time a token is handed out,
//! and rotation invalidates the previous one.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{CreateStaffUser, Role, StaffUser};

fn new_token() -> String {
    format!("ik_{}", Uuid::new_v4().simple())
}

pub async fn user_for_token(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<StaffUser>, sqlx::Error> {
    sqlx::query_as::<_, StaffUser>(
        "SELECT * FROM staff_users WHERE api_token = ? AND is_active = 1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

pub async fn create_staff_user(
    pool: &SqlitePool,
    body: &CreateStaffUser,
) -> Result<StaffUser, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, StaffUser>(
        r#"
        INSERT INTO staff_users (id, username, display_name, role, api_token, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&body.username)
    .bind(&body.display_name)
    .bind(body.role)
    .bind(new_token())
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn rotate_token(pool: &SqlitePool, id: Uuid) -> Result<Option<StaffUser>, sqlx::Error> {
    sqlx::query_as::<_, StaffUser>(
        "UPDATE staff_users SET api_token = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(new_token())
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Seeds the admin account from configuration when the table is empty, so a
/// fresh deployment has a way in.
pub async fn ensure_bootstrap_admin(pool: &SqlitePool, token: &str) -> Result<(), sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staff_users")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(());
    }
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO staff_users (id, username, display_name, role, api_token, created_at, updated_at)
        VALUES (?, 'admin', 'Bootstrap Admin', ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(Role::Admin)
    .bind(token)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    tracing::info!("seeded bootstrap admin account");
    Ok(())
}
