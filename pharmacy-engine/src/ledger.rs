//! Stock ledger
//!
//! Pure functions over a product slice: decide whether a set of requested
//! (product, quantity) pairs is satisfiable, and compute the signed stock
//! deltas to apply or reverse. Nothing here touches the record store.

use serde::{Deserialize, Serialize};
use shared::models::{Product, StockChange};

/// One requested (product, quantity) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedItem {
    pub product_id: String,
    pub quantity: i64,
}

impl RequestedItem {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Per-item availability check outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCheck {
    pub product_id: String,
    pub requested: i64,
    pub available: i64,
    pub satisfied: bool,
}

/// Aggregated availability check outcome
///
/// `is_available` is the AND of every item's individual check; `errors`
/// collects one display-safe message per failing item, in item order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCheckResult {
    pub is_available: bool,
    pub checks: Vec<StockCheck>,
    pub errors: Vec<String>,
}

/// Signed stock adjustment for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub product_id: String,
    pub delta: i64,
}

/// Combine duplicate product references by summing their quantities
///
/// First-occurrence order is preserved, so a product appears exactly once
/// in every downstream check and delta list.
pub fn combine_items(items: &[RequestedItem]) -> Vec<RequestedItem> {
    let mut combined: Vec<RequestedItem> = Vec::new();
    for item in items {
        match combined
            .iter_mut()
            .find(|c| c.product_id == item.product_id)
        {
            Some(existing) => existing.quantity += item.quantity,
            None => combined.push(item.clone()),
        }
    }
    combined
}

/// Sum of requested quantities across all items (before combining)
pub fn total_requested(items: &[RequestedItem]) -> i64 {
    items.iter().map(|i| i.quantity).sum()
}

fn find_product<'a>(products: &'a [Product], product_id: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.id == product_id)
}

/// Check whether every requested item is satisfiable against current stock
///
/// Side-effect free. Duplicate product references are combined before
/// checking, so availability is judged against the summed quantity.
pub fn check_availability(products: &[Product], items: &[RequestedItem]) -> StockCheckResult {
    let combined = combine_items(items);
    let mut checks = Vec::with_capacity(combined.len());
    let mut errors = Vec::new();

    for item in &combined {
        let product = find_product(products, &item.product_id);
        let available = product.map(|p| p.stock).unwrap_or(0);

        let satisfied = if item.quantity <= 0 {
            errors.push(format!(
                "Invalid quantity {} for product {}",
                item.quantity, item.product_id
            ));
            false
        } else {
            match product {
                None => {
                    errors.push(format!("Product {} not found", item.product_id));
                    false
                }
                Some(p) if item.quantity > p.stock => {
                    errors.push(format!(
                        "{}: requested {}, available {}",
                        p.name, item.quantity, p.stock
                    ));
                    false
                }
                Some(_) => true,
            }
        };

        checks.push(StockCheck {
            product_id: item.product_id.clone(),
            requested: item.quantity,
            available,
            satisfied,
        });
    }

    StockCheckResult {
        is_available: errors.is_empty(),
        checks,
        errors,
    }
}

/// Deltas to apply when an order is created: negative of each quantity
///
/// Duplicate product references are combined first, so a single product
/// is adjusted exactly once per order.
pub fn application_deltas(items: &[RequestedItem]) -> Vec<StockDelta> {
    combine_items(items)
        .into_iter()
        .map(|item| StockDelta {
            product_id: item.product_id,
            delta: -item.quantity,
        })
        .collect()
}

/// Deltas to apply when an order is cancelled: negation of the recorded
/// creation-time stock changes
///
/// Computed from the order's own change log rather than its item list, so
/// later catalog edits cannot skew the reversal.
pub fn reversal_deltas(changes: &[StockChange]) -> Vec<StockDelta> {
    changes
        .iter()
        .map(|c| StockDelta {
            product_id: c.product_id.clone(),
            delta: -c.delta,
        })
        .collect()
}
