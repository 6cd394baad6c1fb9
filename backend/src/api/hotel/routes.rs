//! Defines the HTTP routes for the hotel domain.
//!
//! Maps room inventory, customer, reservation and payment paths to their
//! handler functions. Mounted under `/api/hotel`.

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/room-types",
            get(handlers::list_room_types).post(handlers::create_room_type),
        )
        .route("/room-types/:id", get(handlers::get_room_type))
        .route("/rooms", get(handlers::list_rooms).post(handlers::create_room))
        .route("/rooms/:id", get(handlers::get_room))
        .route("/rooms/:id/status", post(handlers::update_room_status))
        .route(
            "/customers",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/customers/:id",
            get(handlers::get_customer).put(handlers::update_customer),
        )
        .route(
            "/reservations",
            get(handlers::list_reservations).post(handlers::create_reservation),
        )
        .route("/reservations/:id", get(handlers::get_reservation))
        .route("/reservations/:id/confirm", post(handlers::confirm_reservation))
        .route("/reservations/:id/check-in", post(handlers::check_in_reservation))
        .route("/reservations/:id/check-out", post(handlers::check_out_reservation))
        .route("/reservations/:id/cancel", post(handlers::cancel_reservation))
        .route("/reservations/:id/no-show", post(handlers::mark_no_show))
        .route(
            "/reservations/:id/payments",
            get(handlers::list_payments).post(handlers::create_payment),
        )
        .route("/payments/:id/complete", post(handlers::complete_payment))
        .route("/payments/:id/refund", post(handlers::refund_payment))
}
