//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
///
/// `stock` is an exact integer count; it is mutated only by the order
/// reconciliation engine, never by UI-facing code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price in currency units
    pub price: Decimal,
    /// Units on hand
    pub stock: i64,
    /// Category reference (String ID)
    pub category: String,
    pub requires_prescription: bool,
    /// Pharmacy reference (String ID)
    pub pharmacy_id: String,
    pub is_active: bool,
}
