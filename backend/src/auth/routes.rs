//! Defines the HTTP routes for staff account management.
//!
//! Mounted under `/api/auth`; every route additionally requires the admin
//! role on top of the API-wide token check.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::middleware::require_admin;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/staff", get(handlers::list_staff).post(handlers::create_staff))
        .route("/staff/:id/deactivate", post(handlers::deactivate_staff))
        .route("/staff/:id/rotate-token", post(handlers::rotate_staff_token))
        .route_layer(middleware::from_fn(require_admin))
}
