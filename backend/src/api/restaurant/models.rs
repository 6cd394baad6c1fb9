//! Rust structs that represent the restaurant domain tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Cleaning,
    OutOfService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MenuItemStatus {
    Available,
    Unavailable,
    OutOfStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    RoomService,
    Delivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OrderItemStatus {
    Pending,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum BillStatus {
    Draft,
    Finalized,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum BillPaymentMethod {
    Cash,
    Card,
    RoomCharge,
    DigitalWallet,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RestaurantArea {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub capacity: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiningTable {
    pub id: i64,
    pub number: String,
    pub area_id: i64,
    pub capacity: i64,
    pub status: TableStatus,
    pub is_active: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub display_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub description: String,
    pub price: f64,
    pub cost: f64,
    pub preparation_minutes: i64,
    pub allergens: String,
    pub status: MenuItemStatus,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub is_active: bool,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub order_type: OrderType,
    pub table_id: Option<i64>,
    pub customer_name: String,
    pub room_number: String,
    pub delivery_address: String,
    pub phone_number: String,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub service_charge: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub special_instructions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: Uuid,
    pub menu_item_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub special_instructions: String,
    pub status: OrderItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bill {
    pub id: Uuid,
    pub bill_number: String,
    pub order_id: Uuid,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub service_charge_rate: f64,
    pub service_charge: f64,
    pub discount_percentage: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub payment_method: Option<BillPaymentMethod>,
    pub status: BillStatus,
    pub payment_received: f64,
    pub change_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Percentage-based bill amounts derived from the order subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BillAmounts {
    pub tax_amount: f64,
    pub service_charge: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
}

pub fn bill_amounts(
    subtotal: f64,
    tax_rate: f64,
    service_charge_rate: f64,
    discount_percentage: f64,
) -> BillAmounts {
    let tax_amount = subtotal * tax_rate / 100.0;
    let service_charge = subtotal * service_charge_rate / 100.0;
    let discount_amount = subtotal * discount_percentage / 100.0;
    BillAmounts {
        tax_amount,
        service_charge,
        discount_amount,
        total_amount: subtotal + tax_amount + service_charge - discount_amount,
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArea {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1))]
    pub capacity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTable {
    #[validate(length(min = 1))]
    pub number: String,
    pub area_id: i64,
    #[validate(range(min = 1))]
    pub capacity: i64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTableStatus {
    pub status: TableStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMenuCategory {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_order: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMenuItem {
    #[validate(length(min = 1))]
    pub name: String,
    pub category_id: i64,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub cost: f64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub preparation_minutes: i64,
    #[serde(default)]
    pub allergens: String,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub is_gluten_free: bool,
    #[serde(default)]
    pub display_order: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrder {
    pub order_type: OrderType,
    pub table_id: Option<i64>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub room_number: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub special_instructions: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddOrderItem {
    pub menu_item_id: i64,
    #[validate(range(min = 1))]
    pub quantity: i64,
    /// Price override; the menu price when absent.
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub special_instructions: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

/// Order together with its line items, as returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct IssueBill {
    #[validate(range(min = 0.0))]
    #[serde(default = "default_rate")]
    pub tax_rate: f64,
    #[validate(range(min = 0.0))]
    #[serde(default = "default_rate")]
    pub service_charge_rate: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default)]
    pub discount_percentage: f64,
}

fn default_rate() -> f64 {
    10.0
}

#[derive(Debug, Deserialize, Validate)]
pub struct SettleBill {
    pub payment_method: BillPaymentMethod,
    #[validate(range(min = 0.0))]
    pub payment_received: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bill_amounts_apply_rates_to_subtotal() {
        let amounts = bill_amounts(200.0, 10.0, 5.0, 25.0);
        assert!((amounts.tax_amount - 20.0).abs() < 1e-9);
        assert!((amounts.service_charge - 10.0).abs() < 1e-9);
        assert!((amounts.discount_amount - 50.0).abs() < 1e-9);
        assert!((amounts.total_amount - 180.0).abs() < 1e-9);
    }

    #[test]
    fn bill_amounts_with_zero_rates_keep_subtotal() {
        let amounts = bill_amounts(99.5, 0.0, 0.0, 0.0);
        assert!((amounts.total_amount - 99.5).abs() < 1e-9);
    }
}
