//! Shared fixtures for the integration tests: an in-memory database with the
//! full schema, a seeded admin account and a console SMS gateway, plus small
//! helpers for driving the router.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use adapters::{ConsoleGateway, SmsGateway};
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::Router;
use backend::config::{AppConfig, GatewayKind, SmsConfig};
use backend::{auth, database, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "ik_test_admin_token";

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        bootstrap_admin_token: Some(ADMIN_TOKEN.into()),
        run_background_tasks: false,
        sms: SmsConfig {
            gateway: GatewayKind::Console,
            sender_id: "INNKEEPER".into(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            dispatch_interval: Duration::from_secs(10),
            automation_interval: Duration::from_secs(60),
            stats_interval: Duration::from_secs(3600),
            max_retries: 3,
        },
    }
}

pub async fn test_state_with_gateway(gateway: Arc<dyn SmsGateway>) -> AppState {
    let pool = database::connect_in_memory()
        .await
        .expect("in-memory database");
    auth::service::ensure_bootstrap_admin(&pool, ADMIN_TOKEN)
        .await
        .expect("bootstrap admin");
    AppState::new(pool, test_config(), gateway)
}

pub async fn test_state() -> (AppState, Arc<ConsoleGateway>) {
    let console = Arc::new(ConsoleGateway::new());
    let state = test_state_with_gateway(console.clone()).await;
    (state, console)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };
    let response = app.clone().oneshot(request).await.expect("route request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, "GET", uri, token, None).await
}

pub async fn post(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    send(app, "POST", uri, token, Some(body)).await
}

pub async fn post_empty(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, "POST", uri, token, None).await
}

pub async fn put(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, "PUT", uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, "DELETE", uri, token, None).await
}
