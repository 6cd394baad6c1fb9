//! Rust structs that represent the SMS domain tables.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TemplateType {
    Welcome,
    BookingConfirmation,
    CheckInReminder,
    CheckOutReminder,
    PaymentReminder,
    BirthdayWishes,
    Promotional,
    FeedbackRequest,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TriggerEvent {
    ReservationCreated,
    CheckInDue,
    CheckOutDue,
    Birthday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MessageType {
    Manual,
    Automated,
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Queued,
    Sending,
    Sent,
    Delivered,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OptOutReason {
    OptOut,
    Complaint,
    Invalid,
    SpamReport,
    AdminBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SmsTemplate {
    pub id: i64,
    pub name: String,
    pub template_type: TemplateType,
    pub body: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AutomationRule {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub trigger_event: TriggerEvent,
    pub template_id: i64,
    pub delay_minutes: i64,
    pub is_active: bool,
    pub send_count: i64,
    pub last_triggered: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SmsMessage {
    pub id: Uuid,
    pub recipient_phone: String,
    pub recipient_name: String,
    pub customer_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub template_id: Option<i64>,
    pub rule_id: Option<i64>,
    pub message_type: MessageType,
    pub body: String,
    pub status: MessageStatus,
    pub provider: String,
    pub provider_message_id: String,
    pub cost: f64,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub sent_time: Option<DateTime<Utc>>,
    pub failure_reason: String,
    pub retry_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SmsOptOut {
    pub id: i64,
    pub phone_number: String,
    pub reason: OptOutReason,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SmsUsageStats {
    pub id: i64,
    pub date: NaiveDate,
    pub total_sent: i64,
    pub total_delivered: i64,
    pub total_failed: i64,
    pub total_cost: f64,
    pub manual_messages: i64,
    pub automated_messages: i64,
    pub api_messages: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplate {
    #[validate(length(min = 1))]
    pub name: String,
    pub template_type: TemplateType,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRule {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub trigger_event: TriggerEvent,
    pub template_id: i64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub delay_minutes: i64,
}

/// Manual send request: either a raw body or a template plus variables.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessage {
    #[validate(length(min = 3))]
    pub recipient_phone: String,
    #[serde(default)]
    pub recipient_name: String,
    pub customer_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub body: Option<String>,
    pub template_id: Option<i64>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    pub scheduled_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct MessageFilter {
    pub status: Option<MessageStatus>,
    pub reservation_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOptOut {
    #[validate(length(min = 3))]
    pub phone_number: String,
    pub reason: OptOutReason,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsFilter {
    pub date: Option<NaiveDate>,
}
