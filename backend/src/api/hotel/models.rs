//! Rust structs that represent the hotel domain tables.
//!
//! Entities map 1:1 onto rows; the `Create*`/`Update*` structs are the
//! request payloads accepted by the handlers, validated before they touch
//! the database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
    Cleaning,
    OutOfOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum IdType {
    Passport,
    DriversLicense,
    NationalId,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    MobilePayment,
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoomType {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub base_price: f64,
    pub capacity: i64,
    /// Comma-separated amenity list, kept free-form.
    pub amenities: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub id: i64,
    pub number: String,
    pub room_type_id: i64,
    pub floor: i64,
    pub status: RoomStatus,
    pub is_active: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: String,
    pub id_type: IdType,
    pub id_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub reservation_number: String,
    pub customer_id: Uuid,
    pub room_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub actual_check_in: Option<DateTime<Utc>>,
    pub actual_check_out: Option<DateTime<Utc>>,
    pub adults: i64,
    pub children: i64,
    pub total_amount: f64,
    pub status: ReservationStatus,
    pub special_requests: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomType {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub base_price: f64,
    #[validate(range(min = 1))]
    pub capacity: i64,
    #[serde(default)]
    pub amenities: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoom {
    #[validate(length(min = 1))]
    pub number: String,
    pub room_type_id: i64,
    #[validate(range(min = 0))]
    pub floor: i64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoomStatus {
    pub status: RoomStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3))]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub nationality: String,
    pub id_type: IdType,
    #[validate(length(min = 1))]
    pub id_number: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservation {
    pub customer_id: Uuid,
    pub room_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[validate(range(min = 1))]
    #[serde(default = "default_adults")]
    pub adults: i64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub children: i64,
    /// Price override; computed from the room type when absent.
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub special_requests: String,
    #[serde(default)]
    pub notes: String,
}

fn default_adults() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RoomFilter {
    pub status: Option<RoomStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePayment {
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub notes: String,
}
