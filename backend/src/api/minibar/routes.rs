//! Defines the HTTP routes for the minibar domain.
//!
//! Mounted under `/api/minibar`.

use axum::routing::{get, post, put};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/minibars",
            get(handlers::list_minibars).post(handlers::create_minibar),
        )
        .route("/minibars/:id", get(handlers::get_minibar))
        .route("/minibars/:id/inventory", put(handlers::set_inventory_item))
        .route("/minibars/:id/restock", post(handlers::restock_minibar))
        .route("/minibars/:id/consumptions", post(handlers::record_consumption))
        .route("/consumptions", get(handlers::list_consumptions))
        .route("/consumptions/:id/confirm", post(handlers::confirm_consumption))
        .route("/consumptions/:id/dispute", post(handlers::dispute_consumption))
        .route("/consumptions/:id/cancel", post(handlers::cancel_consumption))
        .route(
            "/reservations/:id/billing",
            get(handlers::reservation_billing_summary),
        )
}
