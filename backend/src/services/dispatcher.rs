//! Outbound SMS dispatch.
//!
//! Drains the queued messages whose scheduled time has passed, hands them to
//! the configured gateway and records the outcome. Failures are retried with
//! a bounded retry count; opted-out recipients are cancelled before any
//! provider traffic happens. Also maintains the daily usage statistics.

use std::sync::Arc;

use adapters::{OutboundSms, SmsGateway};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::api::sms::models::SmsMessage;

/// Messages taken per tick; the rest wait for the next one.
const DISPATCH_BATCH_SIZE: i64 = 50;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: u32,
    pub failed: u32,
    pub requeued: u32,
    pub cancelled: u32,
}

async fn is_opted_out(pool: &SqlitePool, phone: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sms_opt_outs WHERE phone_number = ?")
        .bind(phone)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// One dispatcher tick. Separated from the loop so tests can drive it.
pub async fn process_due_messages(
    pool: &SqlitePool,
    gateway: &Arc<dyn SmsGateway>,
    sender_id: &str,
    max_retries: u32,
    now: DateTime<Utc>,
) -> Result<DispatchOutcome, sqlx::Error> {
    let due = sqlx::query_as::<_, SmsMessage>(
        r#"
        SELECT * FROM sms_messages
        WHERE status = 'queued' AND (scheduled_time IS NULL OR scheduled_time <= ?)
        ORDER BY created_at
        LIMIT ?
        "#,
    )
    .bind(now)
    .bind(DISPATCH_BATCH_SIZE)
    .fetch_all(pool)
    .await?;

    let mut outcome = DispatchOutcome::default();
    for message in due {
        if is_opted_out(pool, &message.recipient_phone).await? {
            sqlx::query(
                r#"
                UPDATE sms_messages
                SET status = 'cancelled', failure_reason = 'recipient opted out', updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(now)
            .bind(message.id)
            .execute(pool)
            .await?;
            outcome.cancelled += 1;
            continue;
        }

        sqlx::query("UPDATE sms_messages SET status = 'sending', updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(message.id)
            .execute(pool)
            .await?;

        let outbound = OutboundSms {
            to: message.recipient_phone.clone(),
            from: sender_id.to_string(),
            body: message.body.clone(),
        };
        match gateway.send(&outbound).await {
            Ok(receipt) => {
                sqlx::query(
                    r#"
                    UPDATE sms_messages
                    SET status = 'sent', sent_time = ?, provider = ?, provider_message_id = ?,
                        cost = ?, failure_reason = '', updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(now)
                .bind(gateway.name())
                .bind(&receipt.provider_message_id)
                .bind(receipt.cost.unwrap_or(0.0))
                .bind(now)
                .bind(message.id)
                .execute(pool)
                .await?;
                outcome.sent += 1;
            }
            Err(err) => {
                let retries = message.retry_count as u32 + 1;
                if retries >= max_retries {
                    sqlx::query(
                        r#"
                        UPDATE sms_messages
                        SET status = 'failed', retry_count = ?, failure_reason = ?, updated_at = ?
                        WHERE id = ?
                        "#,
                    )
                    .bind(retries as i64)
                    .bind(err.to_string())
                    .bind(now)
                    .bind(message.id)
                    .execute(pool)
                    .await?;
                    warn!(message_id = %message.id, error = %err, "sms permanently failed");
                    outcome.failed += 1;
                } else {
                    sqlx::query(
                        r#"
                        UPDATE sms_messages
                        SET status = 'queued', retry_count = ?, failure_reason = ?, updated_at = ?
                        WHERE id = ?
                        "#,
                    )
                    .bind(retries as i64)
                    .bind(err.to_string())
                    .bind(now)
                    .bind(message.id)
                    .execute(pool)
                    .await?;
                    warn!(message_id = %message.id, retry = retries, error = %err, "sms send failed, requeued");
                    outcome.requeued += 1;
                }
            }
        }
    }
    Ok(outcome)
}

/// Recomputes the usage row for one day from the message table.
pub async fn refresh_daily_stats(pool: &SqlitePool, date: NaiveDate) -> Result<(), sqlx::Error> {
    let (sent, delivered, failed, cost, manual, automated, api): (i64, i64, i64, f64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status IN ('sent', 'delivered') THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'delivered' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status IN ('sent', 'delivered') THEN cost ELSE 0.0 END), 0.0),
                COALESCE(SUM(CASE WHEN message_type = 'manual' AND status IN ('sent', 'delivered') THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN message_type = 'automated' AND status IN ('sent', 'delivered') THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN message_type = 'api' AND status IN ('sent', 'delivered') THEN 1 ELSE 0 END), 0)
            FROM sms_messages
            WHERE date(COALESCE(sent_time, updated_at)) = ?
            "#,
        )
        .bind(date)
        .fetch_one(pool)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO sms_usage_stats
            (date, total_sent, total_delivered, total_failed, total_cost,
             manual_messages, automated_messages, api_messages, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (date) DO UPDATE SET
            total_sent = excluded.total_sent,
            total_delivered = excluded.total_delivered,
            total_failed = excluded.total_failed,
            total_cost = excluded.total_cost,
            manual_messages = excluded.manual_messages,
            automated_messages = excluded.automated_messages,
            api_messages = excluded.api_messages,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(date)
    .bind(sent)
    .bind(delivered)
    .bind(failed)
    .bind(cost)
    .bind(manual)
    .bind(automated)
    .bind(api)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn run(
    pool: SqlitePool,
    gateway: Arc<dyn SmsGateway>,
    sender_id: String,
    max_retries: u32,
    interval: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match process_due_messages(&pool, &gateway, &sender_id, max_retries, Utc::now()).await {
            Ok(outcome) if outcome != DispatchOutcome::default() => {
                info!(
                    sent = outcome.sent,
                    failed = outcome.failed,
                    requeued = outcome.requeued,
                    cancelled = outcome.cancelled,
                    "sms dispatch tick"
                );
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "sms dispatch tick failed"),
        }
    }
}

pub async fn run_stats(pool: SqlitePool, interval: std::time::Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if let Err(err) = refresh_daily_stats(&pool, Utc::now().date_naive()).await {
            warn!(error = %err, "daily sms stats refresh failed");
        }
    }
}
