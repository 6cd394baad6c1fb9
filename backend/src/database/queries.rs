//! Cross-domain database lookups.
//!
//! Centralizes the record fetches that several API domains and background
//! services share, so handlers do not re-implement the same queries against
//! other domains' tables.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::hotel::models::{Customer, Reservation, Room, RoomStatus, RoomType};

pub async fn room_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn room_type_by_id(pool: &SqlitePool, id: i64) -> Result<Option<RoomType>, sqlx::Error> {
    sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn customer_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn reservation_by_id(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<Reservation>, sqlx::Error> {
    sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn set_room_status(
    pool: &SqlitePool,
    room_id: i64,
    status: RoomStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE rooms SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(chrono::Utc::now())
        .bind(room_id)
        .execute(pool)
        .await?;
    Ok(())
}
