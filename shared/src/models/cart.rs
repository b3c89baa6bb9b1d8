//! Cart Model

use serde::{Deserialize, Serialize};

/// One line in a user's cart
///
/// The cart-badge poll derives its count from these entries; the cart is
/// otherwise owned by UI-facing code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntry {
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
}
