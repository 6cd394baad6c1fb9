//! Handler functions for the minibar API.
//!
//! Product catalog, per-room minibar instances with inventory, consumption
//! tracking that keeps inventory in sync, restocking to par levels, and the
//! reservation billing summary.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::database::queries;
use crate::errors::ApiError;
use crate::AppState;

use super::models::{
    ConsumptionFilter, ConsumptionStatus, CreateProduct, CreateRoomMinibar, MinibarBillingSummary,
    MinibarConsumption, MinibarDetail, MinibarInventory, MinibarProduct, RecordConsumption,
    RestockResult, RestockedItem, RoomMinibar, SetInventoryItem, MINIBAR_TAX_RATE,
};

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<MinibarProduct>>, ApiError> {
    let products = sqlx::query_as::<_, MinibarProduct>(
        "SELECT * FROM minibar_products ORDER BY product_type, name",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProduct>,
) -> Result<(StatusCode, Json<MinibarProduct>), ApiError> {
    body.validate()?;
    let now = Utc::now();
    let product = sqlx::query_as::<_, MinibarProduct>(
        r#"
        INSERT INTO minibar_products
            (name, brand, product_type, description, price, cost_price, barcode,
             volume_size, alcohol_content, requires_id_check, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .bind(&body.brand)
    .bind(body.product_type)
    .bind(&body.description)
    .bind(body.price)
    .bind(body.cost_price)
    .bind(&body.barcode)
    .bind(&body.volume_size)
    .bind(body.alcohol_content)
    .bind(body.requires_id_check)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_minibars(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomMinibar>>, ApiError> {
    let minibars = sqlx::query_as::<_, RoomMinibar>("SELECT * FROM room_minibars ORDER BY room_id")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(minibars))
}

pub async fn create_minibar(
    State(state): State<AppState>,
    Json(body): Json<CreateRoomMinibar>,
) -> Result<(StatusCode, Json<RoomMinibar>), ApiError> {
    if queries::room_by_id(&state.pool, body.room_id).await?.is_none() {
        return Err(ApiError::NotFound("room"));
    }
    let now = Utc::now();
    let minibar = sqlx::query_as::<_, RoomMinibar>(
        r#"
        INSERT INTO room_minibars (room_id, created_at, updated_at)
        VALUES (?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(body.room_id)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(minibar)))
}

async fn minibar_by_id(
    pool: &sqlx::SqlitePool,
    id: i64,
) -> Result<Option<RoomMinibar>, sqlx::Error> {
    sqlx::query_as::<_, RoomMinibar>("SELECT * FROM room_minibars WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn inventory_for(
    pool: &sqlx::SqlitePool,
    minibar_id: i64,
) -> Result<Vec<MinibarInventory>, sqlx::Error> {
    sqlx::query_as::<_, MinibarInventory>(
        "SELECT * FROM minibar_inventory WHERE minibar_id = ? ORDER BY product_id",
    )
    .bind(minibar_id)
    .fetch_all(pool)
    .await
}

pub async fn get_minibar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MinibarDetail>, ApiError> {
    let minibar = minibar_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("minibar"))?;
    let inventory = inventory_for(&state.pool, id).await?;
    let needs_restocking = inventory.iter().any(MinibarInventory::needs_restocking);
    Ok(Json(MinibarDetail {
        minibar,
        inventory,
        needs_restocking,
    }))
}

pub async fn set_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SetInventoryItem>,
) -> Result<Json<MinibarInventory>, ApiError> {
    body.validate()?;
    if minibar_by_id(&state.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("minibar"));
    }
    let product_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM minibar_products WHERE id = ?")
        .bind(body.product_id)
        .fetch_one(&state.pool)
        .await?;
    if product_exists == 0 {
        return Err(ApiError::NotFound("product"));
    }
    let row = sqlx::query_as::<_, MinibarInventory>(
        r#"
        INSERT INTO minibar_inventory (minibar_id, product_id, quantity, par_level, expiry_date, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (minibar_id, product_id) DO UPDATE SET
            quantity = excluded.quantity,
            par_level = excluded.par_level,
            expiry_date = excluded.expiry_date,
            updated_at = excluded.updated_at
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(body.product_id)
    .bind(body.quantity)
    .bind(body.par_level)
    .bind(body.expiry_date)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(row))
}

pub async fn restock_minibar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RestockResult>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let minibar = sqlx::query_as::<_, RoomMinibar>("SELECT * FROM room_minibars WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("minibar"))?;

    let now = Utc::now();
    let below_par = sqlx::query_as::<_, MinibarInventory>(
        "SELECT * FROM minibar_inventory WHERE minibar_id = ? AND quantity < par_level",
    )
    .bind(minibar.id)
    .fetch_all(&mut *tx)
    .await?;

    let mut restocked = Vec::with_capacity(below_par.len());
    for row in &below_par {
        let added = row.par_level - row.quantity;
        sqlx::query(
            "UPDATE minibar_inventory SET quantity = par_level, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(row.id)
        .execute(&mut *tx)
        .await?;
        restocked.push(RestockedItem {
            product_id: row.product_id,
            quantity_added: added,
        });
    }
    sqlx::query("UPDATE room_minibars SET last_restocked = ?, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(now)
        .bind(minibar.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Json(RestockResult {
        minibar_id: minibar.id,
        restocked,
    }))
}

pub async fn list_consumptions(
    State(state): State<AppState>,
    Query(filter): Query<ConsumptionFilter>,
) -> Result<Json<Vec<MinibarConsumption>>, ApiError> {
    let mut sql = String::from("SELECT * FROM minibar_consumptions WHERE 1 = 1");
    if filter.reservation_id.is_some() {
        sql.push_str(" AND reservation_id = ?");
    }
    if filter.status.is_some() {
        sql.push_str(" AND status = ?");
    }
    sql.push_str(" ORDER BY consumed_at DESC");

    let mut query = sqlx::query_as::<_, MinibarConsumption>(&sql);
    if let Some(reservation_id) = filter.reservation_id {
        query = query.bind(reservation_id);
    }
    if let Some(status) = filter.status {
        query = query.bind(status);
    }
    Ok(Json(query.fetch_all(&state.pool).await?))
}

pub async fn record_consumption(
    State(state): State<AppState>,
    Path(minibar_id): Path<i64>,
    Json(body): Json<RecordConsumption>,
) -> Result<(StatusCode, Json<MinibarConsumption>), ApiError> {
    body.validate()?;
    let mut tx = state.pool.begin().await?;

    let minibar = sqlx::query_as::<_, RoomMinibar>("SELECT * FROM room_minibars WHERE id = ?")
        .bind(minibar_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("minibar"))?;
    let reservation_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE id = ?")
        .bind(body.reservation_id)
        .fetch_one(&mut *tx)
        .await?;
    if reservation_exists == 0 {
        return Err(ApiError::NotFound("reservation"));
    }
    let product = sqlx::query_as::<_, MinibarProduct>("SELECT * FROM minibar_products WHERE id = ?")
        .bind(body.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("product"))?;

    let stock = sqlx::query_as::<_, MinibarInventory>(
        "SELECT * FROM minibar_inventory WHERE minibar_id = ? AND product_id = ?",
    )
    .bind(minibar.id)
    .bind(product.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("inventory item"))?;
    if stock.quantity < body.quantity {
        return Err(ApiError::Conflict(format!(
            "only {} of {} left in the minibar",
            stock.quantity, product.name
        )));
    }

    let unit_price = body.unit_price.unwrap_or(product.price);
    let total_amount = unit_price * body.quantity as f64;
    let now = Utc::now();

    sqlx::query(
        "UPDATE minibar_inventory SET quantity = quantity - ?, updated_at = ? WHERE id = ?",
    )
    .bind(body.quantity)
    .bind(now)
    .bind(stock.id)
    .execute(&mut *tx)
    .await?;

    let consumption = sqlx::query_as::<_, MinibarConsumption>(
        r#"
        INSERT INTO minibar_consumptions
            (id, minibar_id, reservation_id, product_id, quantity, unit_price,
             total_amount, consumed_at, detection_method, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(minibar.id)
    .bind(body.reservation_id)
    .bind(product.id)
    .bind(body.quantity)
    .bind(unit_price)
    .bind(total_amount)
    .bind(now)
    .bind(body.detection_method)
    .bind(&body.notes)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(consumption)))
}

async fn consumption_by_id(
    pool: &sqlx::SqlitePool,
    id: Uuid,
) -> Result<Option<MinibarConsumption>, sqlx::Error> {
    sqlx::query_as::<_, MinibarConsumption>("SELECT * FROM minibar_consumptions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn transition_consumption(
    state: &AppState,
    id: Uuid,
    to: ConsumptionStatus,
) -> Result<MinibarConsumption, ApiError> {
    let consumption = consumption_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("consumption"))?;
    if consumption.status != ConsumptionStatus::Pending {
        return Err(ApiError::Conflict(
            "only pending consumptions can change status".into(),
        ));
    }
    let updated = sqlx::query_as::<_, MinibarConsumption>(
        "UPDATE minibar_consumptions SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(to)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(updated)
}

pub async fn confirm_consumption(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MinibarConsumption>, ApiError> {
    let consumption = transition_consumption(&state, id, ConsumptionStatus::Confirmed).await?;
    Ok(Json(consumption))
}

pub async fn dispute_consumption(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MinibarConsumption>, ApiError> {
    let consumption = transition_consumption(&state, id, ConsumptionStatus::Disputed).await?;
    Ok(Json(consumption))
}

pub async fn cancel_consumption(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MinibarConsumption>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let consumption =
        sqlx::query_as::<_, MinibarConsumption>("SELECT * FROM minibar_consumptions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ApiError::NotFound("consumption"))?;
    if consumption.status != ConsumptionStatus::Pending {
        return Err(ApiError::Conflict("only pending consumptions can be cancelled".into()));
    }
    let now = Utc::now();
    // Put the stock back; the guest never took it after all.
    sqlx::query(
        r#"
        UPDATE minibar_inventory SET quantity = quantity + ?, updated_at = ?
        WHERE minibar_id = ? AND product_id = ?
        "#,
    )
    .bind(consumption.quantity)
    .bind(now)
    .bind(consumption.minibar_id)
    .bind(consumption.product_id)
    .execute(&mut *tx)
    .await?;
    let updated = sqlx::query_as::<_, MinibarConsumption>(
        "UPDATE minibar_consumptions SET status = 'cancelled', updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(now)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(Json(updated))
}

pub async fn reservation_billing_summary(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<MinibarBillingSummary>, ApiError> {
    if queries::reservation_by_id(&state.pool, reservation_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("reservation"));
    }
    let (consumption_count, subtotal): (i64, f64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(total_amount), 0.0)
        FROM minibar_consumptions
        WHERE reservation_id = ? AND status = 'confirmed'
        "#,
    )
    .bind(reservation_id)
    .fetch_one(&state.pool)
    .await?;
    let tax_amount = subtotal * MINIBAR_TAX_RATE;
    Ok(Json(MinibarBillingSummary {
        reservation_id,
        consumption_count,
        subtotal,
        tax_amount,
        total_amount: subtotal + tax_amount,
    }))
}
