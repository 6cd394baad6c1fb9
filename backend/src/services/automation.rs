//! SMS automation rules.
//!
//! Evaluates the active rules on a fixed interval: new reservations,
//! check-ins and check-outs due today, and customer birthdays. Matching
//! targets get a rendered message enqueued with the rule's delay. A dedup
//! query guarantees a rule never enqueues twice for the same target.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::api::hotel::models::{Customer, Reservation};
use crate::api::sms::models::{AutomationRule, SmsTemplate, TriggerEvent};
use crate::database::queries;
use crate::utils::render_template;

/// Look-back window for the `reservation_created` trigger.
const CREATED_LOOKBACK_MINUTES: i64 = 60;

/// Template context shared by every trigger.
fn customer_context(customer: &Customer) -> HashMap<&'static str, String> {
    let mut context = HashMap::new();
    context.insert("customer_name", customer.full_name());
    context.insert("first_name", customer.first_name.clone());
    context.insert("last_name", customer.last_name.clone());
    context
}

async fn reservation_context(
    pool: &SqlitePool,
    customer: &Customer,
    reservation: &Reservation,
) -> Result<HashMap<&'static str, String>, sqlx::Error> {
    let mut context = customer_context(customer);
    context.insert("reservation_number", reservation.reservation_number.clone());
    context.insert("check_in_date", reservation.check_in_date.to_string());
    context.insert("check_out_date", reservation.check_out_date.to_string());
    context.insert("total_amount", format!("{:.2}", reservation.total_amount));
    context.insert("nights", reservation.nights().to_string());
    if let Some(room) = queries::room_by_id(pool, reservation.room_id).await? {
        context.insert("room_number", room.number);
    }
    Ok(context)
}

async fn enqueue_automated(
    pool: &SqlitePool,
    rule: &AutomationRule,
    template: &SmsTemplate,
    customer: &Customer,
    reservation: Option<&Reservation>,
    context: &HashMap<&'static str, String>,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let body = render_template(&template.body, context);
    let scheduled = now + Duration::minutes(rule.delay_minutes);
    sqlx::query(
        r#"
        INSERT INTO sms_messages
            (id, recipient_phone, recipient_name, customer_id, reservation_id, template_id,
             rule_id, message_type, body, status, scheduled_time, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 'automated', ?, 'queued', ?, ?, ?)
        "#,
    )
    .bind(uuid::Uuid::new_v4())
    .bind(&customer.phone)
    .bind(customer.full_name())
    .bind(customer.id)
    .bind(reservation.map(|r| r.id))
    .bind(template.id)
    .bind(rule.id)
    .bind(&body)
    .bind(scheduled)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

async fn reservations_for_trigger(
    pool: &SqlitePool,
    rule: &AutomationRule,
    now: DateTime<Utc>,
) -> Result<Vec<Reservation>, sqlx::Error> {
    let today = now.date_naive();
    match rule.trigger_event {
        TriggerEvent::ReservationCreated => {
            let cutoff = now - Duration::minutes(CREATED_LOOKBACK_MINUTES);
            sqlx::query_as::<_, Reservation>(
                r#"
                SELECT r.* FROM reservations r
                WHERE r.created_at >= ?
                  AND r.status IN ('pending', 'confirmed')
                  AND NOT EXISTS (
                      SELECT 1 FROM sms_messages m
                      WHERE m.rule_id = ? AND m.reservation_id = r.id
                  )
                "#,
            )
            .bind(cutoff)
            .bind(rule.id)
            .fetch_all(pool)
            .await
        }
        TriggerEvent::CheckInDue => {
            sqlx::query_as::<_, Reservation>(
                r#"
                SELECT r.* FROM reservations r
                WHERE r.check_in_date = ?
                  AND r.status = 'confirmed'
                  AND NOT EXISTS (
                      SELECT 1 FROM sms_messages m
                      WHERE m.rule_id = ? AND m.reservation_id = r.id
                  )
                "#,
            )
            .bind(today)
            .bind(rule.id)
            .fetch_all(pool)
            .await
        }
        TriggerEvent::CheckOutDue => {
            sqlx::query_as::<_, Reservation>(
                r#"
                SELECT r.* FROM reservations r
                WHERE r.check_out_date = ?
                  AND r.status = 'checked_in'
                  AND NOT EXISTS (
                      SELECT 1 FROM sms_messages m
                      WHERE m.rule_id = ? AND m.reservation_id = r.id
                  )
                "#,
            )
            .bind(today)
            .bind(rule.id)
            .fetch_all(pool)
            .await
        }
        TriggerEvent::Birthday => Ok(Vec::new()),
    }
}

async fn birthday_customers(
    pool: &SqlitePool,
    rule: &AutomationRule,
    now: DateTime<Utc>,
) -> Result<Vec<Customer>, sqlx::Error> {
    let today = now.date_naive();
    sqlx::query_as::<_, Customer>(
        r#"
        SELECT c.* FROM customers c
        WHERE c.date_of_birth IS NOT NULL
          AND strftime('%m-%d', c.date_of_birth) = strftime('%m-%d', ?)
          AND NOT EXISTS (
              SELECT 1 FROM sms_messages m
              WHERE m.rule_id = ? AND m.customer_id = c.id AND date(m.created_at) = date(?)
          )
        "#,
    )
    .bind(today)
    .bind(rule.id)
    .bind(today)
    .fetch_all(pool)
    .await
}

/// One automation pass. Returns how many messages were enqueued.
pub async fn evaluate_rules(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u32, sqlx::Error> {
    let rules = sqlx::query_as::<_, AutomationRule>(
        "SELECT * FROM sms_automation_rules WHERE is_active = 1",
    )
    .fetch_all(pool)
    .await?;

    let mut enqueued = 0_u32;
    for rule in &rules {
        let template = match sqlx::query_as::<_, SmsTemplate>(
            "SELECT * FROM sms_templates WHERE id = ? AND is_active = 1",
        )
        .bind(rule.template_id)
        .fetch_optional(pool)
        .await?
        {
            Some(template) => template,
            None => {
                warn!(rule = %rule.name, "automation rule has no active template");
                continue;
            }
        };

        let mut rule_sends = 0_u32;
        if rule.trigger_event == TriggerEvent::Birthday {
            for customer in birthday_customers(pool, rule, now).await? {
                let context = customer_context(&customer);
                enqueue_automated(pool, rule, &template, &customer, None, &context, now).await?;
                rule_sends += 1;
            }
        } else {
            for reservation in reservations_for_trigger(pool, rule, now).await? {
                let customer = match queries::customer_by_id(pool, reservation.customer_id).await? {
                    Some(customer) => customer,
                    None => continue,
                };
                let context = reservation_context(pool, &customer, &reservation).await?;
                enqueue_automated(
                    pool,
                    rule,
                    &template,
                    &customer,
                    Some(&reservation),
                    &context,
                    now,
                )
                .await?;
                rule_sends += 1;
            }
        }

        if rule_sends > 0 {
            sqlx::query(
                r#"
                UPDATE sms_automation_rules
                SET send_count = send_count + ?, last_triggered = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(rule_sends as i64)
            .bind(now)
            .bind(now)
            .bind(rule.id)
            .execute(pool)
            .await?;
            enqueued += rule_sends;
        }
    }
    Ok(enqueued)
}

pub async fn run(pool: SqlitePool, interval: std::time::Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match evaluate_rules(&pool, Utc::now()).await {
            Ok(0) => {}
            Ok(enqueued) => info!(enqueued, "automation pass enqueued messages"),
            Err(err) => warn!(error = %err, "automation pass failed"),
        }
    }
}
