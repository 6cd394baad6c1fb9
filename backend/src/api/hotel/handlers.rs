//! Handler functions for the hotel API.
//!
//! Room inventory, guest records, reservations with their status lifecycle,
//! and reservation payments. Multi-step mutations run inside transactions so
//! availability checks and inserts stay consistent.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::database::queries;
use crate::errors::ApiError;
use crate::utils::generate_reference;
use crate::AppState;

use super::models::{
    CreateCustomer, CreatePayment, CreateReservation, CreateRoom, CreateRoomType, Customer,
    Payment, PaymentStatus, Reservation, ReservationFilter, ReservationStatus, Room, RoomFilter,
    RoomStatus, RoomType, UpdateRoomStatus,
};

pub async fn list_room_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomType>>, ApiError> {
    let room_types = sqlx::query_as::<_, RoomType>("SELECT * FROM room_types ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(room_types))
}

pub async fn create_room_type(
    State(state): State<AppState>,
    Json(body): Json<CreateRoomType>,
) -> Result<(StatusCode, Json<RoomType>), ApiError> {
    body.validate()?;
    let now = Utc::now();
    let room_type = sqlx::query_as::<_, RoomType>(
        r#"
        INSERT INTO room_types (name, description, base_price, capacity, amenities, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.base_price)
    .bind(body.capacity)
    .bind(&body.amenities)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(room_type)))
}

pub async fn get_room_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RoomType>, ApiError> {
    queries::room_type_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("room type"))
}

pub async fn list_rooms(
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let rooms = match filter.status {
        Some(status) => {
            sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE status = ? ORDER BY number")
                .bind(status)
                .fetch_all(&state.pool)
                .await?
        }
        None => {
            sqlx::query_as::<_, Room>("SELECT * FROM rooms ORDER BY number")
                .fetch_all(&state.pool)
                .await?
        }
    };
    Ok(Json(rooms))
}

pub async fn create_room(
    State(state): State<AppState>,
    Json(body): Json<CreateRoom>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    body.validate()?;
    if queries::room_type_by_id(&state.pool, body.room_type_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("room type"));
    }
    let now = Utc::now();
    let room = sqlx::query_as::<_, Room>(
        r#"
        INSERT INTO rooms (number, room_type_id, floor, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.number)
    .bind(body.room_type_id)
    .bind(body.floor)
    .bind(&body.notes)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Room>, ApiError> {
    queries::room_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("room"))
}

pub async fn update_room_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRoomStatus>,
) -> Result<Json<Room>, ApiError> {
    let room = sqlx::query_as::<_, Room>(
        "UPDATE rooms SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(body.status)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound("room"))?;
    Ok(Json(room))
}

pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers =
        sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?;
    Ok(Json(customers))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(body): Json<CreateCustomer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    body.validate()?;
    let now = Utc::now();
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers
            (id, first_name, last_name, email, phone, address, date_of_birth,
             nationality, id_type, id_number, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.address)
    .bind(body.date_of_birth)
    .bind(&body.nationality)
    .bind(body.id_type)
    .bind(&body.id_number)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateCustomer>,
) -> Result<Json<Customer>, ApiError> {
    body.validate()?;
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        UPDATE customers
        SET first_name = ?, last_name = ?, email = ?, phone = ?, address = ?,
            date_of_birth = ?, nationality = ?, id_type = ?, id_number = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.address)
    .bind(body.date_of_birth)
    .bind(&body.nationality)
    .bind(body.id_type)
    .bind(&body.id_number)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound("customer"))?;
    Ok(Json(customer))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    queries::customer_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("customer"))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Query(filter): Query<ReservationFilter>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    let mut sql = String::from("SELECT * FROM reservations WHERE 1 = 1");
    if filter.status.is_some() {
        sql.push_str(" AND status = ?");
    }
    if filter.customer_id.is_some() {
        sql.push_str(" AND customer_id = ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query = sqlx::query_as::<_, Reservation>(&sql);
    if let Some(status) = filter.status {
        query = query.bind(status);
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.bind(customer_id);
    }
    Ok(Json(query.fetch_all(&state.pool).await?))
}

pub async fn create_reservation(
    State(state): State<AppState>,
    Json(body): Json<CreateReservation>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    body.validate()?;
    if body.check_in_date >= body.check_out_date {
        return Err(ApiError::Validation(
            "check-out must be after check-in".into(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(body.room_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("room"))?;
    if !room.is_active {
        return Err(ApiError::Conflict("room is not in service".into()));
    }
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
        .bind(body.customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("customer"))?;

    // Overbooking guard: any non-terminal reservation overlapping the window
    // blocks the new one.
    let overlapping: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE room_id = ?
          AND status IN ('pending', 'confirmed', 'checked_in')
          AND check_in_date < ?
          AND check_out_date > ?
        "#,
    )
    .bind(body.room_id)
    .bind(body.check_out_date)
    .bind(body.check_in_date)
    .fetch_one(&mut *tx)
    .await?;
    if overlapping > 0 {
        return Err(ApiError::Conflict(format!(
            "room {} is already reserved in that period",
            room.number
        )));
    }

    let nights = (body.check_out_date - body.check_in_date).num_days();
    let total_amount = match body.total_amount {
        Some(amount) if amount >= 0.0 => amount,
        Some(_) => return Err(ApiError::Validation("total_amount must not be negative".into())),
        None => {
            let room_type = sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE id = ?")
                .bind(room.room_type_id)
                .fetch_one(&mut *tx)
                .await?;
            room_type.base_price * nights as f64
        }
    };

    let now = Utc::now();
    let reservation = sqlx::query_as::<_, Reservation>(
        r#"
        INSERT INTO reservations
            (id, reservation_number, customer_id, room_id, check_in_date, check_out_date,
             adults, children, total_amount, status, special_requests, notes,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(generate_reference("RES", now.date_naive()))
    .bind(customer.id)
    .bind(room.id)
    .bind(body.check_in_date)
    .bind(body.check_out_date)
    .bind(body.adults)
    .bind(body.children)
    .bind(total_amount)
    .bind(&body.special_requests)
    .bind(&body.notes)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    queries::reservation_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("reservation"))
}

async fn transition_reservation(
    state: &AppState,
    id: Uuid,
    from: &[ReservationStatus],
    to: ReservationStatus,
) -> Result<Reservation, ApiError> {
    let reservation = queries::reservation_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("reservation"))?;
    if !from.contains(&reservation.status) {
        return Err(ApiError::Conflict(format!(
            "reservation {} cannot move to {:?} from its current status",
            reservation.reservation_number, to
        )));
    }
    let updated = sqlx::query_as::<_, Reservation>(
        "UPDATE reservations SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(to)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(updated)
}

pub async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = transition_reservation(
        &state,
        id,
        &[ReservationStatus::Pending],
        ReservationStatus::Confirmed,
    )
    .await?;
    Ok(Json(reservation))
}

pub async fn check_in_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = queries::reservation_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("reservation"))?;
    if reservation.status != ReservationStatus::Confirmed {
        return Err(ApiError::Conflict(
            "only confirmed reservations can be checked in".into(),
        ));
    }
    let now = Utc::now();
    let updated = sqlx::query_as::<_, Reservation>(
        r#"
        UPDATE reservations
        SET status = 'checked_in', actual_check_in = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    queries::set_room_status(&state.pool, updated.room_id, RoomStatus::Occupied).await?;
    Ok(Json(updated))
}

pub async fn check_out_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = queries::reservation_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("reservation"))?;
    if reservation.status != ReservationStatus::CheckedIn {
        return Err(ApiError::Conflict(
            "only checked-in reservations can be checked out".into(),
        ));
    }
    let now = Utc::now();
    let updated = sqlx::query_as::<_, Reservation>(
        r#"
        UPDATE reservations
        SET status = 'checked_out', actual_check_out = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    queries::set_room_status(&state.pool, updated.room_id, RoomStatus::Cleaning).await?;
    Ok(Json(updated))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = queries::reservation_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("reservation"))?;
    if !matches!(
        reservation.status,
        ReservationStatus::Pending | ReservationStatus::Confirmed
    ) {
        return Err(ApiError::Conflict(
            "only pending or confirmed reservations can be cancelled".into(),
        ));
    }
    if reservation.check_in_date <= Utc::now().date_naive() {
        return Err(ApiError::Conflict(
            "cannot cancel on or after the check-in date".into(),
        ));
    }
    let updated = transition_reservation(
        &state,
        id,
        &[ReservationStatus::Pending, ReservationStatus::Confirmed],
        ReservationStatus::Cancelled,
    )
    .await?;
    Ok(Json(updated))
}

pub async fn mark_no_show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = queries::reservation_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("reservation"))?;
    if reservation.check_in_date >= Utc::now().date_naive() {
        return Err(ApiError::Conflict(
            "a reservation can only be a no-show after its check-in date".into(),
        ));
    }
    let updated = transition_reservation(
        &state,
        id,
        &[ReservationStatus::Pending, ReservationStatus::Confirmed],
        ReservationStatus::NoShow,
    )
    .await?;
    Ok(Json(updated))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE reservation_id = ? ORDER BY created_at DESC",
    )
    .bind(reservation_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(payments))
}

pub async fn create_payment(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
    Json(body): Json<CreatePayment>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    body.validate()?;
    let reservation = queries::reservation_by_id(&state.pool, reservation_id)
        .await?
        .ok_or(ApiError::NotFound("reservation"))?;
    if reservation.status == ReservationStatus::Cancelled {
        return Err(ApiError::Conflict(
            "cannot record a payment for a cancelled reservation".into(),
        ));
    }
    let now = Utc::now();
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments
            (id, reservation_id, amount, payment_method, transaction_id, notes,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(reservation.id)
    .bind(body.amount)
    .bind(body.payment_method)
    .bind(&body.transaction_id)
    .bind(&body.notes)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn transition_payment(
    state: &AppState,
    id: Uuid,
    from: PaymentStatus,
    to: PaymentStatus,
) -> Result<Payment, ApiError> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("payment"))?;
    if payment.status != from {
        return Err(ApiError::Conflict(format!(
            "payment is {:?}, expected {:?}",
            payment.status, from
        )));
    }
    let updated = sqlx::query_as::<_, Payment>(
        "UPDATE payments SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(to)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(updated)
}

pub async fn complete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    let payment =
        transition_payment(&state, id, PaymentStatus::Pending, PaymentStatus::Completed).await?;
    Ok(Json(payment))
}

pub async fn refund_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    let payment =
        transition_payment(&state, id, PaymentStatus::Completed, PaymentStatus::Refunded).await?;
    Ok(Json(payment))
}
