//! Defines the HTTP routes for the restaurant domain.
//!
//! Mounted under `/api/restaurant`.

use axum::routing::{delete, get, post};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/areas", get(handlers::list_areas).post(handlers::create_area))
        .route("/tables", get(handlers::list_tables).post(handlers::create_table))
        .route("/tables/:id/status", post(handlers::update_table_status))
        .route(
            "/menu/categories",
            get(handlers::list_menu_categories).post(handlers::create_menu_category),
        )
        .route(
            "/menu/items",
            get(handlers::list_menu_items).post(handlers::create_menu_item),
        )
        .route("/orders", get(handlers::list_orders).post(handlers::create_order))
        .route("/orders/:id", get(handlers::get_order))
        .route("/orders/:id/items", post(handlers::add_order_item))
        .route("/orders/:id/items/:item_id", delete(handlers::remove_order_item))
        .route("/orders/:id/status", post(handlers::update_order_status))
        .route("/orders/:id/bill", post(handlers::issue_bill))
        .route("/bills/:id", get(handlers::get_bill))
        .route("/bills/:id/settle", post(handlers::settle_bill))
}
