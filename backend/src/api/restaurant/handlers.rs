//! Handler functions for the restaurant API.
//!
//! Areas, tables, the menu, orders with line items and derived totals, and
//! billing. Item mutations recompute the parent order's totals inside the
//! same transaction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ApiError;
use crate::utils::generate_reference;
use crate::AppState;

use super::models::{
    AddOrderItem, Bill, BillStatus, CreateArea, CreateMenuCategory, CreateMenuItem, CreateOrder,
    CreateTable, DiningTable, IssueBill, MenuCategory, MenuItem, Order, OrderDetail, OrderFilter,
    OrderItem, OrderStatus, RestaurantArea, SettleBill, UpdateOrderStatus, UpdateTableStatus,
    bill_amounts,
};

pub async fn list_areas(
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantArea>>, ApiError> {
    let areas = sqlx::query_as::<_, RestaurantArea>("SELECT * FROM restaurant_areas ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(areas))
}

pub async fn create_area(
    State(state): State<AppState>,
    Json(body): Json<CreateArea>,
) -> Result<(StatusCode, Json<RestaurantArea>), ApiError> {
    body.validate()?;
    let area = sqlx::query_as::<_, RestaurantArea>(
        r#"
        INSERT INTO restaurant_areas (name, description, capacity, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.capacity)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(area)))
}

pub async fn list_tables(
    State(state): State<AppState>,
) -> Result<Json<Vec<DiningTable>>, ApiError> {
    let tables =
        sqlx::query_as::<_, DiningTable>("SELECT * FROM restaurant_tables ORDER BY number")
            .fetch_all(&state.pool)
            .await?;
    Ok(Json(tables))
}

pub async fn create_table(
    State(state): State<AppState>,
    Json(body): Json<CreateTable>,
) -> Result<(StatusCode, Json<DiningTable>), ApiError> {
    body.validate()?;
    let area_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurant_areas WHERE id = ?")
        .bind(body.area_id)
        .fetch_one(&state.pool)
        .await?;
    if area_exists == 0 {
        return Err(ApiError::NotFound("restaurant area"));
    }
    let now = Utc::now();
    let table = sqlx::query_as::<_, DiningTable>(
        r#"
        INSERT INTO restaurant_tables (number, area_id, capacity, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.number)
    .bind(body.area_id)
    .bind(body.capacity)
    .bind(&body.notes)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(table)))
}

pub async fn update_table_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTableStatus>,
) -> Result<Json<DiningTable>, ApiError> {
    let table = sqlx::query_as::<_, DiningTable>(
        "UPDATE restaurant_tables SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(body.status)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound("table"))?;
    Ok(Json(table))
}

pub async fn list_menu_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<MenuCategory>>, ApiError> {
    let categories = sqlx::query_as::<_, MenuCategory>(
        "SELECT * FROM menu_categories ORDER BY display_order, name",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(categories))
}

pub async fn create_menu_category(
    State(state): State<AppState>,
    Json(body): Json<CreateMenuCategory>,
) -> Result<(StatusCode, Json<MenuCategory>), ApiError> {
    body.validate()?;
    let category = sqlx::query_as::<_, MenuCategory>(
        r#"
        INSERT INTO menu_categories (name, description, display_order, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.display_order)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_menu_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    let items = sqlx::query_as::<_, MenuItem>(
        "SELECT * FROM menu_items ORDER BY category_id, display_order, name",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(items))
}

pub async fn create_menu_item(
    State(state): State<AppState>,
    Json(body): Json<CreateMenuItem>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
    body.validate()?;
    let category_exists: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM menu_categories WHERE id = ?")
            .bind(body.category_id)
            .fetch_one(&state.pool)
            .await?;
    if category_exists == 0 {
        return Err(ApiError::NotFound("menu category"));
    }
    let now = Utc::now();
    let item = sqlx::query_as::<_, MenuItem>(
        r#"
        INSERT INTO menu_items
            (name, category_id, description, price, cost, preparation_minutes, allergens,
             is_vegetarian, is_vegan, is_gluten_free, display_order, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .bind(body.category_id)
    .bind(&body.description)
    .bind(body.price)
    .bind(body.cost)
    .bind(body.preparation_minutes)
    .bind(&body.allergens)
    .bind(body.is_vegetarian)
    .bind(body.is_vegan)
    .bind(body.is_gluten_free)
    .bind(body.display_order)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = match filter.status {
        Some(status) => {
            sqlx::query_as::<_, Order>(
                "SELECT * FROM orders WHERE status = ? ORDER BY created_at DESC",
            )
            .bind(status)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
                .fetch_all(&state.pool)
                .await?
        }
    };
    Ok(Json(orders))
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    body.validate()?;
    if let Some(table_id) = body.table_id {
        let table_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM restaurant_tables WHERE id = ?")
                .bind(table_id)
                .fetch_one(&state.pool)
                .await?;
        if table_exists == 0 {
            return Err(ApiError::NotFound("table"));
        }
    }
    let now = Utc::now();
    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders
            (id, order_number, order_type, table_id, customer_name, room_number,
             delivery_address, phone_number, special_instructions, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(generate_reference("ORD", now.date_naive()))
    .bind(body.order_type)
    .bind(body.table_id)
    .bind(&body.customer_name)
    .bind(&body.room_number)
    .bind(&body.delivery_address)
    .bind(&body.phone_number)
    .bind(&body.special_instructions)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn order_by_id(pool: &sqlx::SqlitePool, id: Uuid) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = order_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(OrderDetail { order, items }))
}

/// Re-derives the order's subtotal and total from its non-cancelled items.
async fn recompute_order_totals(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: Uuid,
) -> Result<Order, sqlx::Error> {
    let subtotal: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total_price), 0.0)
        FROM order_items
        WHERE order_id = ? AND status != 'cancelled'
        "#,
    )
    .bind(order_id)
    .fetch_one(&mut **tx)
    .await?;
    sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET subtotal = ?,
            total_amount = ? + tax_amount + service_charge - discount_amount,
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(subtotal)
    .bind(subtotal)
    .bind(Utc::now())
    .bind(order_id)
    .fetch_one(&mut **tx)
    .await
}

pub async fn add_order_item(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<AddOrderItem>,
) -> Result<(StatusCode, Json<OrderDetail>), ApiError> {
    body.validate()?;
    let mut tx = state.pool.begin().await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("order"))?;
    if !matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed) {
        return Err(ApiError::Conflict(
            "items can only be added while the order is open".into(),
        ));
    }
    let menu_item = sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE id = ?")
        .bind(body.menu_item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("menu item"))?;
    if !menu_item.is_active {
        return Err(ApiError::Conflict("menu item is not active".into()));
    }

    let unit_price = body.unit_price.unwrap_or(menu_item.price);
    let total_price = unit_price * body.quantity as f64;
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO order_items
            (order_id, menu_item_id, quantity, unit_price, total_price,
             special_instructions, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(order_id)
    .bind(body.menu_item_id)
    .bind(body.quantity)
    .bind(unit_price)
    .bind(total_price)
    .bind(&body.special_instructions)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let order = recompute_order_totals(&mut tx, order_id).await?;
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(OrderDetail { order, items })))
}

pub async fn remove_order_item(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(Uuid, i64)>,
) -> Result<Json<OrderDetail>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let removed = sqlx::query("DELETE FROM order_items WHERE id = ? AND order_id = ?")
        .bind(item_id)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;
    if removed.rows_affected() == 0 {
        return Err(ApiError::NotFound("order item"));
    }
    let order = recompute_order_totals(&mut tx, order_id).await?;
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(Json(OrderDetail { order, items }))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateOrderStatus>,
) -> Result<Json<Order>, ApiError> {
    let order = order_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;
    if matches!(order.status, OrderStatus::Completed | OrderStatus::Cancelled) {
        return Err(ApiError::Conflict("order is already closed".into()));
    }
    let updated = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(body.status)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(updated))
}

pub async fn issue_bill(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<IssueBill>,
) -> Result<(StatusCode, Json<Bill>), ApiError> {
    body.validate()?;
    let order = order_by_id(&state.pool, order_id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;
    if order.status == OrderStatus::Cancelled {
        return Err(ApiError::Conflict("cannot bill a cancelled order".into()));
    }
    let amounts = bill_amounts(
        order.subtotal,
        body.tax_rate,
        body.service_charge_rate,
        body.discount_percentage,
    );
    let now = Utc::now();
    let bill = sqlx::query_as::<_, Bill>(
        r#"
        INSERT INTO bills
            (id, bill_number, order_id, subtotal, tax_rate, tax_amount,
             service_charge_rate, service_charge, discount_percentage, discount_amount,
             total_amount, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(generate_reference("BILL", now.date_naive()))
    .bind(order_id)
    .bind(order.subtotal)
    .bind(body.tax_rate)
    .bind(amounts.tax_amount)
    .bind(body.service_charge_rate)
    .bind(amounts.service_charge)
    .bind(body.discount_percentage)
    .bind(amounts.discount_amount)
    .bind(amounts.total_amount)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(bill)))
}

pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Bill>, ApiError> {
    sqlx::query_as::<_, Bill>("SELECT * FROM bills WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("bill"))
}

pub async fn settle_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SettleBill>,
) -> Result<Json<Bill>, ApiError> {
    body.validate()?;
    let mut tx = state.pool.begin().await?;
    let bill = sqlx::query_as::<_, Bill>("SELECT * FROM bills WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("bill"))?;
    if matches!(bill.status, BillStatus::Paid | BillStatus::Cancelled) {
        return Err(ApiError::Conflict("bill is already settled".into()));
    }
    if body.payment_received + 1e-9 < bill.total_amount {
        return Err(ApiError::Validation(format!(
            "payment {:.2} is below the bill total {:.2}",
            body.payment_received, bill.total_amount
        )));
    }
    let change = body.payment_received - bill.total_amount;
    let settled = sqlx::query_as::<_, Bill>(
        r#"
        UPDATE bills
        SET status = 'paid', payment_method = ?, payment_received = ?,
            change_amount = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(body.payment_method)
    .bind(body.payment_received)
    .bind(change)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;
    sqlx::query("UPDATE orders SET status = 'completed', updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(settled.order_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(Json(settled))
}
