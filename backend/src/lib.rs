//! Innkeeper backend library.
//!
//! Exposes the application state, router assembly and every module the
//! binary and the integration tests share.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;
pub mod utils;

use std::sync::Arc;

use adapters::{ConsoleGateway, GatewayError, SmsGateway, TwilioGateway};
use axum::middleware as axum_middleware;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::SqlitePool;

use config::{AppConfig, GatewayKind};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub gateway: Arc<dyn SmsGateway>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig, gateway: Arc<dyn SmsGateway>) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            gateway,
        }
    }
}

/// Builds the gateway selected by configuration.
pub fn build_gateway(config: &AppConfig) -> Result<Arc<dyn SmsGateway>, GatewayError> {
    match config.sms.gateway {
        GatewayKind::Console => Ok(Arc::new(ConsoleGateway::new())),
        GatewayKind::Twilio => {
            let gateway = TwilioGateway::new(
                config.sms.twilio_account_sid.clone(),
                config.sms.twilio_auth_token.clone(),
            )?;
            Ok(Arc::new(gateway))
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Assembles the full application router. Everything under `/api` requires a
/// staff bearer token; `/health` stays open for probes.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/hotel", api::hotel::routes::router())
        .nest("/employees", api::employees::routes::router())
        .nest("/restaurant", api::restaurant::routes::router())
        .nest("/minibar", api::minibar::routes::router())
        .nest("/sms", api::sms::routes::router())
        .nest("/auth", auth::routes::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(axum_middleware::from_fn(middleware::trace_requests))
        .with_state(state)
}
