//! Tests for the SMS background pipeline: dispatch with retry and opt-out
//! handling, automation rule evaluation with dedup, and the daily stats
//! rollup.

mod common;

use std::sync::Arc;

use adapters::{GatewayError, OutboundSms, SmsGateway, SmsReceipt};
use async_trait::async_trait;
use axum::http::StatusCode;
use backend::build_router;
use backend::services::{automation, dispatcher};
use chrono::{Datelike, Duration, Utc};
use serde_json::json;

use common::{get, post, post_empty, ADMIN_TOKEN};

/// Gateway that refuses every message, for retry-path tests.
struct FailingGateway;

#[async_trait]
impl SmsGateway for FailingGateway {
    fn name(&self) -> &str {
        "failing"
    }

    async fn send(&self, _message: &OutboundSms) -> Result<SmsReceipt, GatewayError> {
        Err(GatewayError::Transport("connection refused".into()))
    }
}

#[tokio::test]
async fn manual_message_is_dispatched_through_the_gateway() {
    let (state, console) = common::test_state().await;
    let app = build_router(state.clone());

    let (status, message) = post(
        &app,
        "/api/sms/messages",
        Some(ADMIN_TOKEN),
        json!({ "recipient_phone": "+15550101", "body": "Your room is ready." }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(message["status"], "queued");
    let message_id = message["id"].as_str().expect("message id").to_string();

    let outcome = dispatcher::process_due_messages(
        &state.pool,
        &state.gateway,
        &state.config.sms.sender_id,
        state.config.sms.max_retries,
        Utc::now(),
    )
    .await
    .expect("dispatch tick");
    assert_eq!(outcome.sent, 1);

    let sent = console.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "+15550101");
    assert_eq!(sent[0].body, "Your room is ready.");

    let (_, stored) = get(&app, &format!("/api/sms/messages/{message_id}"), Some(ADMIN_TOKEN)).await;
    assert_eq!(stored["status"], "sent");
    assert_eq!(stored["provider"], "console");
    assert_eq!(stored["provider_message_id"], "console-1");
    assert!(stored["sent_time"].is_string());
}

#[tokio::test]
async fn scheduled_messages_wait_for_their_time() {
    let (state, _console) = common::test_state().await;
    let app = build_router(state.clone());

    let later = Utc::now() + Duration::hours(2);
    let (_, message) = post(
        &app,
        "/api/sms/messages",
        Some(ADMIN_TOKEN),
        json!({
            "recipient_phone": "+15550102",
            "body": "See you soon",
            "scheduled_time": later
        }),
    )
    .await;
    let message_id = message["id"].as_str().expect("message id").to_string();

    let outcome = dispatcher::process_due_messages(
        &state.pool,
        &state.gateway,
        &state.config.sms.sender_id,
        state.config.sms.max_retries,
        Utc::now(),
    )
    .await
    .expect("dispatch tick");
    assert_eq!(outcome.sent, 0, "not due yet");

    let outcome = dispatcher::process_due_messages(
        &state.pool,
        &state.gateway,
        &state.config.sms.sender_id,
        state.config.sms.max_retries,
        later + Duration::minutes(1),
    )
    .await
    .expect("dispatch tick");
    assert_eq!(outcome.sent, 1);

    let (_, stored) = get(&app, &format!("/api/sms/messages/{message_id}"), Some(ADMIN_TOKEN)).await;
    assert_eq!(stored["status"], "sent");
}

#[tokio::test]
async fn opted_out_recipients_are_cancelled_not_sent() {
    let (state, console) = common::test_state().await;
    let app = build_router(state.clone());

    let (status, _) = post(
        &app,
        "/api/sms/opt-outs",
        Some(ADMIN_TOKEN),
        json!({ "phone_number": "+15550103", "reason": "opt_out" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, message) = post(
        &app,
        "/api/sms/messages",
        Some(ADMIN_TOKEN),
        json!({ "recipient_phone": "+15550103", "body": "promo" }),
    )
    .await;
    let message_id = message["id"].as_str().expect("message id").to_string();

    let outcome = dispatcher::process_due_messages(
        &state.pool,
        &state.gateway,
        &state.config.sms.sender_id,
        state.config.sms.max_retries,
        Utc::now(),
    )
    .await
    .expect("dispatch tick");
    assert_eq!(outcome.cancelled, 1);
    assert_eq!(outcome.sent, 0);
    assert!(console.sent_messages().is_empty());

    let (_, stored) = get(&app, &format!("/api/sms/messages/{message_id}"), Some(ADMIN_TOKEN)).await;
    assert_eq!(stored["status"], "cancelled");
    assert_eq!(stored["failure_reason"], "recipient opted out");
}

#[tokio::test]
async fn failed_sends_retry_up_to_the_ceiling() {
    let failing: Arc<dyn SmsGateway> = Arc::new(FailingGateway);
    let state = common::test_state_with_gateway(failing).await;
    let app = build_router(state.clone());

    let (_, message) = post(
        &app,
        "/api/sms/messages",
        Some(ADMIN_TOKEN),
        json!({ "recipient_phone": "+15550104", "body": "hello" }),
    )
    .await;
    let message_id = message["id"].as_str().expect("message id").to_string();

    // max_retries is 3: two requeues, then a permanent failure.
    for expected_requeues in [1, 2] {
        let outcome = dispatcher::process_due_messages(
            &state.pool,
            &state.gateway,
            &state.config.sms.sender_id,
            state.config.sms.max_retries,
            Utc::now(),
        )
        .await
        .expect("dispatch tick");
        assert_eq!(outcome.requeued, 1);
        let (_, stored) =
            get(&app, &format!("/api/sms/messages/{message_id}"), Some(ADMIN_TOKEN)).await;
        assert_eq!(stored["status"], "queued");
        assert_eq!(stored["retry_count"], json!(expected_requeues));
    }

    let outcome = dispatcher::process_due_messages(
        &state.pool,
        &state.gateway,
        &state.config.sms.sender_id,
        state.config.sms.max_retries,
        Utc::now(),
    )
    .await
    .expect("dispatch tick");
    assert_eq!(outcome.failed, 1);

    let (_, stored) = get(&app, &format!("/api/sms/messages/{message_id}"), Some(ADMIN_TOKEN)).await;
    assert_eq!(stored["status"], "failed");
    assert_eq!(stored["retry_count"], json!(3));
    assert!(stored["failure_reason"]
        .as_str()
        .expect("reason")
        .contains("connection refused"));
}

async fn seed_confirmed_checkin_today(app: &axum::Router) -> String {
    let (_, room_type) = post(
        app,
        "/api/hotel/room-types",
        Some(ADMIN_TOKEN),
        json!({ "name": "Standard", "description": "", "base_price": 90.0, "capacity": 2 }),
    )
    .await;
    let (_, room) = post(
        app,
        "/api/hotel/rooms",
        Some(ADMIN_TOKEN),
        json!({ "number": "101", "room_type_id": room_type["id"], "floor": 1 }),
    )
    .await;
    let (_, customer) = post(
        app,
        "/api/hotel/customers",
        Some(ADMIN_TOKEN),
        json!({
            "first_name": "Noor",
            "last_name": "Haddad",
            "email": "noor@example.com",
            "phone": "+15550105",
            "id_type": "national_id",
            "id_number": "N-1"
        }),
    )
    .await;
    let today = Utc::now().date_naive();
    let (status, reservation) = post(
        app,
        "/api/hotel/reservations",
        Some(ADMIN_TOKEN),
        json!({
            "customer_id": customer["id"],
            "room_id": room["id"],
            "check_in_date": today,
            "check_out_date": today + Duration::days(2)
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let reservation_id = reservation["id"].as_str().expect("id").to_string();
    let (status, _) = post_empty(
        app,
        &format!("/api/hotel/reservations/{reservation_id}/confirm"),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    reservation_id
}

#[tokio::test]
async fn check_in_rule_enqueues_rendered_message_once() {
    let (state, console) = common::test_state().await;
    let app = build_router(state.clone());

    seed_confirmed_checkin_today(&app).await;

    let (_, template) = post(
        &app,
        "/api/sms/templates",
        Some(ADMIN_TOKEN),
        json!({
            "name": "Check-in reminder",
            "template_type": "check_in_reminder",
            "body": "Hi {customer_name}, room {room_number} is ready from 14:00."
        }),
    )
    .await;
    let (status, _) = post(
        &app,
        "/api/sms/rules",
        Some(ADMIN_TOKEN),
        json!({
            "name": "checkin-day-reminder",
            "trigger_event": "check_in_due",
            "template_id": template["id"],
            "delay_minutes": 0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let now = Utc::now();
    let enqueued = automation::evaluate_rules(&state.pool, now).await.expect("pass");
    assert_eq!(enqueued, 1);

    // A second pass must not enqueue a duplicate.
    let enqueued = automation::evaluate_rules(&state.pool, now).await.expect("pass");
    assert_eq!(enqueued, 0);

    let (_, messages) = get(&app, "/api/sms/messages?status=queued", Some(ADMIN_TOKEN)).await;
    let queued = messages.as_array().expect("list");
    assert_eq!(queued.len(), 1);
    assert_eq!(
        queued[0]["body"],
        "Hi Noor Haddad, room 101 is ready from 14:00."
    );
    assert_eq!(queued[0]["message_type"], "automated");

    // The rule records its activity.
    let (_, rules) = get(&app, "/api/sms/rules", Some(ADMIN_TOKEN)).await;
    assert_eq!(rules[0]["send_count"], json!(1));
    assert!(rules[0]["last_triggered"].is_string());

    // And the dispatcher delivers it.
    let outcome = dispatcher::process_due_messages(
        &state.pool,
        &state.gateway,
        &state.config.sms.sender_id,
        state.config.sms.max_retries,
        now + Duration::minutes(1),
    )
    .await
    .expect("dispatch tick");
    assert_eq!(outcome.sent, 1);
    assert_eq!(console.sent_messages()[0].to, "+15550105");
}

#[tokio::test]
async fn birthday_rule_matches_todays_birthdays() {
    let (state, _console) = common::test_state().await;
    let app = build_router(state.clone());

    let today = Utc::now().date_naive();
    // 28 years keeps Feb 29 on a leap year, so the date always exists.
    let birthday = today
        .with_year(today.year() - 28)
        .expect("birthday 28 years back");
    let (_, _) = post(
        &app,
        "/api/hotel/customers",
        Some(ADMIN_TOKEN),
        json!({
            "first_name": "Iris",
            "last_name": "Berg",
            "email": "iris@example.com",
            "phone": "+15550106",
            "date_of_birth": birthday,
            "id_type": "passport",
            "id_number": "P-2"
        }),
    )
    .await;
    // A customer without a birthday today must not match.
    let off_birthday = birthday + Duration::days(40);
    let (_, _) = post(
        &app,
        "/api/hotel/customers",
        Some(ADMIN_TOKEN),
        json!({
            "first_name": "Omar",
            "last_name": "Said",
            "email": "omar@example.com",
            "phone": "+15550107",
            "date_of_birth": off_birthday,
            "id_type": "passport",
            "id_number": "P-3"
        }),
    )
    .await;

    let (_, template) = post(
        &app,
        "/api/sms/templates",
        Some(ADMIN_TOKEN),
        json!({
            "name": "Birthday wishes",
            "template_type": "birthday_wishes",
            "body": "Happy birthday, {first_name}!"
        }),
    )
    .await;
    post(
        &app,
        "/api/sms/rules",
        Some(ADMIN_TOKEN),
        json!({
            "name": "birthday-wishes",
            "trigger_event": "birthday",
            "template_id": template["id"]
        }),
    )
    .await;

    let now = Utc::now();
    let enqueued = automation::evaluate_rules(&state.pool, now).await.expect("pass");
    assert_eq!(enqueued, 1);
    let enqueued = automation::evaluate_rules(&state.pool, now).await.expect("pass");
    assert_eq!(enqueued, 0, "deduped for the day");

    let (_, messages) = get(&app, "/api/sms/messages", Some(ADMIN_TOKEN)).await;
    let all = messages.as_array().expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["body"], "Happy birthday, Iris!");
    assert_eq!(all[0]["recipient_phone"], "+15550106");
}

#[tokio::test]
async fn daily_stats_rollup_counts_outcomes() {
    let (state, _console) = common::test_state().await;
    let app = build_router(state.clone());

    for n in 0..3 {
        post(
            &app,
            "/api/sms/messages",
            Some(ADMIN_TOKEN),
            json!({ "recipient_phone": format!("+1555020{n}"), "body": "ping" }),
        )
        .await;
    }
    let now = Utc::now();
    dispatcher::process_due_messages(
        &state.pool,
        &state.gateway,
        &state.config.sms.sender_id,
        state.config.sms.max_retries,
        now,
    )
    .await
    .expect("dispatch tick");

    dispatcher::refresh_daily_stats(&state.pool, now.date_naive())
        .await
        .expect("stats rollup");

    let (_, stats) = get(
        &app,
        &format!("/api/sms/stats?date={}", now.date_naive()),
        Some(ADMIN_TOKEN),
    )
    .await;
    let row = &stats.as_array().expect("stats rows")[0];
    assert_eq!(row["total_sent"], json!(3));
    assert_eq!(row["total_failed"], json!(0));
    assert_eq!(row["manual_messages"], json!(3));
}
