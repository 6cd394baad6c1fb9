//! Rust structs that represent the minibar domain tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Tax applied to minibar charges on the reservation bill.
pub const MINIBAR_TAX_RATE: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProductType {
    Beverage,
    Snack,
    Alcohol,
    SoftDrink,
    Water,
    Juice,
    Candy,
    Nuts,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MinibarStatus {
    Active,
    Maintenance,
    Restocking,
    OutOfOrder,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ConsumptionStatus {
    Pending,
    Confirmed,
    Disputed,
    Cancelled,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DetectionMethod {
    Manual,
    Sensor,
    Rfid,
    Checkout,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MinibarProduct {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub product_type: ProductType,
    pub description: String,
    pub price: f64,
    pub cost_price: Option<f64>,
    pub barcode: Option<String>,
    pub volume_size: String,
    pub alcohol_content: Option<f64>,
    pub requires_id_check: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MinibarProduct {
    /// Margin as a percentage of the sale price, when the cost is known.
    pub fn profit_margin(&self) -> Option<f64> {
        self.cost_price
            .filter(|_| self.price > 0.0)
            .map(|cost| (self.price - cost) / self.price * 100.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoomMinibar {
    pub id: i64,
    pub room_id: i64,
    pub status: MinibarStatus,
    pub last_restocked: Option<DateTime<Utc>>,
    pub last_checked: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MinibarInventory {
    pub id: i64,
    pub minibar_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub par_level: i64,
    pub expiry_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl MinibarInventory {
    pub fn needs_restocking(&self) -> bool {
        self.quantity < self.par_level
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MinibarConsumption {
    pub id: Uuid,
    pub minibar_id: i64,
    pub reservation_id: Uuid,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_amount: f64,
    pub consumed_at: DateTime<Utc>,
    pub status: ConsumptionStatus,
    pub detection_method: DetectionMethod,
    pub is_charged: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub product_type: ProductType,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub cost_price: Option<f64>,
    pub barcode: Option<String>,
    #[serde(default)]
    pub volume_size: String,
    pub alcohol_content: Option<f64>,
    #[serde(default)]
    pub requires_id_check: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomMinibar {
    pub room_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetInventoryItem {
    pub product_id: i64,
    #[validate(range(min = 0))]
    pub quantity: i64,
    #[validate(range(min = 0))]
    pub par_level: i64,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordConsumption {
    pub reservation_id: Uuid,
    pub product_id: i64,
    #[validate(range(min = 1))]
    pub quantity: i64,
    /// Charge override; the product price when absent.
    pub unit_price: Option<f64>,
    #[serde(default = "default_detection")]
    pub detection_method: DetectionMethod,
    #[serde(default)]
    pub notes: String,
}

fn default_detection() -> DetectionMethod {
    DetectionMethod::Manual
}

#[derive(Debug, Deserialize)]
pub struct ConsumptionFilter {
    pub reservation_id: Option<Uuid>,
    pub status: Option<ConsumptionStatus>,
}

/// Minibar with its current inventory, as returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct MinibarDetail {
    #[serde(flatten)]
    pub minibar: RoomMinibar,
    pub inventory: Vec<MinibarInventory>,
    pub needs_restocking: bool,
}

#[derive(Debug, Serialize)]
pub struct RestockedItem {
    pub product_id: i64,
    pub quantity_added: i64,
}

#[derive(Debug, Serialize)]
pub struct RestockResult {
    pub minibar_id: i64,
    pub restocked: Vec<RestockedItem>,
}

/// Confirmed consumption charges for a reservation over a period.
#[derive(Debug, Serialize)]
pub struct MinibarBillingSummary {
    pub reservation_id: Uuid,
    pub consumption_count: i64,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(price: f64, cost_price: Option<f64>) -> MinibarProduct {
        MinibarProduct {
            id: 1,
            name: "Still Water".into(),
            brand: String::new(),
            product_type: ProductType::Water,
            description: String::new(),
            price,
            cost_price,
            barcode: None,
            volume_size: "500ml".into(),
            alcohol_content: None,
            requires_id_check: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn profit_margin_requires_cost_price() {
        assert!(product(4.0, None).profit_margin().is_none());
        let margin = product(4.0, Some(1.0)).profit_margin().expect("margin");
        assert!((margin - 75.0).abs() < 1e-9);
    }

    #[test]
    fn inventory_below_par_needs_restocking() {
        let row = MinibarInventory {
            id: 1,
            minibar_id: 1,
            product_id: 1,
            quantity: 1,
            par_level: 3,
            expiry_date: None,
            updated_at: Utc::now(),
        };
        assert!(row.needs_restocking());
    }
}
