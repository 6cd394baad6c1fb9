//! Defines the HTTP routes for the SMS domain.
//!
//! Mounted under `/api/sms`.

use axum::routing::{delete, get, post};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/templates",
            get(handlers::list_templates).post(handlers::create_template),
        )
        .route("/rules", get(handlers::list_rules).post(handlers::create_rule))
        .route(
            "/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .route("/messages/:id", get(handlers::get_message))
        .route("/messages/:id/cancel", post(handlers::cancel_message))
        .route(
            "/opt-outs",
            get(handlers::list_opt_outs).post(handlers::create_opt_out),
        )
        .route("/opt-outs/:id", delete(handlers::delete_opt_out))
        .route("/stats", get(handlers::list_usage_stats))
}
