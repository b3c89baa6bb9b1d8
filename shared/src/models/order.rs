//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order status
///
/// `Cancelled` and `Delivered` are terminal: no further business
/// transition is permitted once either is reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Ready,
    Delivered,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Whether this status permits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Delivered)
    }
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product reference (String ID)
    pub product_id: String,
    pub name: String,
    /// Unit price in currency units at order time
    pub price: Decimal,
    pub quantity: i64,
}

/// One entry in an order's append-only stock change log
///
/// Creation records one entry per distinct product (negative delta);
/// cancellation appends reversal entries (positive delta) rather than
/// mutating existing ones, so the log stays auditable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: String,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub delta: i64,
}

/// Delivery address
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeliveryAddress {
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
    pub phone: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    #[validate(length(min = 1, message = "Customer is required"))]
    pub customer_id: String,
    #[validate(length(min = 1, message = "Pharmacy is required"))]
    pub pharmacy_id: String,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItem>,
    #[validate(nested)]
    pub delivery_address: DeliveryAddress,
    /// Order total; must reconcile with the item lines within rounding tolerance
    pub total: Decimal,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Human-readable sequential order number
    pub order_number: String,
    pub customer_id: String,
    pub pharmacy_id: String,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    /// Append-only stock change log (creation entries, then reversals)
    pub stock_changes: Vec<StockChange>,
    pub delivery_address: DeliveryAddress,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
}
