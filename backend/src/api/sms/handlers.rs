//! Handler functions for the SMS API.
//!
//! Templates, automation rules, the message queue, opt-outs and usage stats.
//! Sending is asynchronous: handlers enqueue messages and the background
//! dispatcher performs the provider traffic.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ApiError;
use crate::utils::render_template;
use crate::AppState;

use super::models::{
    AutomationRule, CreateOptOut, CreateRule, CreateTemplate, MessageFilter, MessageStatus,
    MessageType, SendMessage, SmsMessage, SmsOptOut, SmsTemplate, SmsUsageStats, StatsFilter,
};

pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<SmsTemplate>>, ApiError> {
    let templates = sqlx::query_as::<_, SmsTemplate>(
        "SELECT * FROM sms_templates ORDER BY template_type, name",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(templates))
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(body): Json<CreateTemplate>,
) -> Result<(StatusCode, Json<SmsTemplate>), ApiError> {
    body.validate()?;
    let now = Utc::now();
    let template = sqlx::query_as::<_, SmsTemplate>(
        r#"
        INSERT INTO sms_templates (name, template_type, body, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .bind(body.template_type)
    .bind(&body.body)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<Vec<AutomationRule>>, ApiError> {
    let rules = sqlx::query_as::<_, AutomationRule>("SELECT * FROM sms_automation_rules ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(rules))
}

pub async fn create_rule(
    State(state): State<AppState>,
    Json(body): Json<CreateRule>,
) -> Result<(StatusCode, Json<AutomationRule>), ApiError> {
    body.validate()?;
    let template_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sms_templates WHERE id = ?")
        .bind(body.template_id)
        .fetch_one(&state.pool)
        .await?;
    if template_exists == 0 {
        return Err(ApiError::NotFound("template"));
    }
    let now = Utc::now();
    let rule = sqlx::query_as::<_, AutomationRule>(
        r#"
        INSERT INTO sms_automation_rules
            (name, description, trigger_event, template_id, delay_minutes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.trigger_event)
    .bind(body.template_id)
    .bind(body.delay_minutes)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(filter): Query<MessageFilter>,
) -> Result<Json<Vec<SmsMessage>>, ApiError> {
    let mut sql = String::from("SELECT * FROM sms_messages WHERE 1 = 1");
    if filter.status.is_some() {
        sql.push_str(" AND status = ?");
    }
    if filter.reservation_id.is_some() {
        sql.push_str(" AND reservation_id = ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query = sqlx::query_as::<_, SmsMessage>(&sql);
    if let Some(status) = filter.status {
        query = query.bind(status);
    }
    if let Some(reservation_id) = filter.reservation_id {
        query = query.bind(reservation_id);
    }
    Ok(Json(query.fetch_all(&state.pool).await?))
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessage>,
) -> Result<(StatusCode, Json<SmsMessage>), ApiError> {
    body.validate()?;
    let content = match (&body.body, body.template_id) {
        (Some(raw), _) => raw.clone(),
        (None, Some(template_id)) => {
            let template = sqlx::query_as::<_, SmsTemplate>(
                "SELECT * FROM sms_templates WHERE id = ? AND is_active = 1",
            )
            .bind(template_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(ApiError::NotFound("template"))?;
            let context = body
                .variables
                .iter()
                .map(|(key, value)| (key.as_str(), value.clone()))
                .collect();
            render_template(&template.body, &context)
        }
        (None, None) => {
            return Err(ApiError::Validation(
                "either body or template_id is required".into(),
            ))
        }
    };

    let now = Utc::now();
    let message = sqlx::query_as::<_, SmsMessage>(
        r#"
        INSERT INTO sms_messages
            (id, recipient_phone, recipient_name, customer_id, reservation_id, template_id,
             message_type, body, status, scheduled_time, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'queued', ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&body.recipient_phone)
    .bind(&body.recipient_name)
    .bind(body.customer_id)
    .bind(body.reservation_id)
    .bind(body.template_id)
    .bind(MessageType::Manual)
    .bind(&content)
    .bind(body.scheduled_time)
    .bind(now)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::ACCEPTED, Json(message)))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SmsMessage>, ApiError> {
    sqlx::query_as::<_, SmsMessage>("SELECT * FROM sms_messages WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("message"))
}

pub async fn cancel_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SmsMessage>, ApiError> {
    let message = sqlx::query_as::<_, SmsMessage>("SELECT * FROM sms_messages WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("message"))?;
    if !matches!(message.status, MessageStatus::Pending | MessageStatus::Queued) {
        return Err(ApiError::Conflict(
            "only pending or queued messages can be cancelled".into(),
        ));
    }
    let updated = sqlx::query_as::<_, SmsMessage>(
        "UPDATE sms_messages SET status = 'cancelled', updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(updated))
}

pub async fn list_opt_outs(
    State(state): State<AppState>,
) -> Result<Json<Vec<SmsOptOut>>, ApiError> {
    let opt_outs =
        sqlx::query_as::<_, SmsOptOut>("SELECT * FROM sms_opt_outs ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?;
    Ok(Json(opt_outs))
}

pub async fn create_opt_out(
    State(state): State<AppState>,
    Json(body): Json<CreateOptOut>,
) -> Result<(StatusCode, Json<SmsOptOut>), ApiError> {
    body.validate()?;
    let opt_out = sqlx::query_as::<_, SmsOptOut>(
        r#"
        INSERT INTO sms_opt_outs (phone_number, reason, notes, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.phone_number)
    .bind(body.reason)
    .bind(&body.notes)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;
    Ok((StatusCode::CREATED, Json(opt_out)))
}

pub async fn delete_opt_out(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = sqlx::query("DELETE FROM sms_opt_outs WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("opt-out"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_usage_stats(
    State(state): State<AppState>,
    Query(filter): Query<StatsFilter>,
) -> Result<Json<Vec<SmsUsageStats>>, ApiError> {
    let stats = match filter.date {
        Some(date) => {
            sqlx::query_as::<_, SmsUsageStats>("SELECT * FROM sms_usage_stats WHERE date = ?")
                .bind(date)
                .fetch_all(&state.pool)
                .await?
        }
        None => {
            sqlx::query_as::<_, SmsUsageStats>(
                "SELECT * FROM sms_usage_stats ORDER BY date DESC LIMIT 90",
            )
            .fetch_all(&state.pool)
            .await?
        }
    };
    Ok(Json(stats))
}
