//! Order reconciliation engine
//!
//! Orchestrates order creation and cancellation against the stock ledger
//! and the record store: validate stock, create the order record, apply
//! stock deltas, and reverse those deltas on cancellation. This module is
//! the sole writer of `Product::stock` and `Order::stock_changes`.
//!
//! # Atomicity
//!
//! The underlying store has no transactions, so multi-product stock
//! application is compensated manually: if any single product write fails
//! mid-sequence, already-applied deltas are reversed within the same call
//! before the error propagates. Compensation is attempted once; a failed
//! compensation is surfaced as [`ErrorCode::CompensationFailed`] and left
//! for operational follow-up rather than retried.
//!
//! [`ErrorCode::CompensationFailed`]: shared::error::ErrorCode::CompensationFailed

mod cancel;
mod create;

pub use cancel::CancelledOrder;
pub use create::CreatedOrder;

use crate::ledger::{self, RequestedItem, StockCheck, StockCheckResult, StockDelta};
use crate::store::{Counters, RecordStore, StoreExt, COUNTERS, PRODUCTS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::models::{Product, StockChange};
use std::sync::Arc;

/// Tolerance for reconciling an order total against its item lines (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Availability check outcome plus the total quantity requested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCheckOutcome {
    pub result: StockCheckResult,
    pub total_items_requested: i64,
}

/// Read-only order pre-flight outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub can_proceed: bool,
    pub stock_checks: Vec<StockCheck>,
    pub errors: Vec<String>,
    pub total_items_requested: i64,
}

/// The order reconciliation engine
pub struct OrderEngine {
    store: Arc<dyn RecordStore>,
}

impl OrderEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Check stock availability for a set of requested items
    ///
    /// Pure read; shares its check with [`simulate_order`](Self::simulate_order).
    pub fn check_stock(&self, items: &[RequestedItem]) -> AppResult<StockCheckOutcome> {
        let products: Vec<Product> = self.store.load(PRODUCTS)?;
        Ok(StockCheckOutcome {
            result: ledger::check_availability(&products, items),
            total_items_requested: ledger::total_requested(items),
        })
    }

    /// Pre-flight a cart without creating an order or touching stock
    pub fn simulate_order(&self, items: &[RequestedItem]) -> AppResult<Simulation> {
        let outcome = self.check_stock(items)?;
        Ok(Simulation {
            can_proceed: outcome.result.is_available,
            stock_checks: outcome.result.checks,
            errors: outcome.result.errors,
            total_items_requested: outcome.total_items_requested,
        })
    }

    /// Apply one delta to a product's stock via a whole-collection write
    pub(crate) fn apply_delta(&self, delta: &StockDelta) -> AppResult<StockChange> {
        let mut products: Vec<Product> = self.store.load(PRODUCTS)?;
        let product = products
            .iter_mut()
            .find(|p| p.id == delta.product_id)
            .ok_or_else(|| AppError::product_not_found(delta.product_id.clone()))?;

        let previous_stock = product.stock;
        let new_stock = previous_stock + delta.delta;
        product.stock = new_stock;
        let product_id = product.id.clone();

        self.store.save(PRODUCTS, &products)?;
        Ok(StockChange {
            product_id,
            previous_stock,
            new_stock,
            delta: delta.delta,
        })
    }

    /// Apply a delta sequence, reversing already-applied deltas on failure
    pub(crate) fn apply_deltas(&self, deltas: &[StockDelta]) -> AppResult<Vec<StockChange>> {
        let mut applied = Vec::with_capacity(deltas.len());
        for delta in deltas {
            match self.apply_delta(delta) {
                Ok(change) => applied.push(change),
                Err(original) => return Err(self.compensate(&applied, original)),
            }
        }
        Ok(applied)
    }

    /// Reverse already-applied stock changes after a mid-sequence failure
    ///
    /// Returns the error to propagate: the original failure when
    /// compensation succeeds, a compensation failure carrying both
    /// messages otherwise.
    pub(crate) fn compensate(&self, applied: &[StockChange], original: AppError) -> AppError {
        for change in applied.iter().rev() {
            let reverse = StockDelta {
                product_id: change.product_id.clone(),
                delta: -change.delta,
            };
            if let Err(comp) = self.apply_delta(&reverse) {
                tracing::error!(
                    product_id = %change.product_id,
                    original = %original.message,
                    compensation = %comp.message,
                    "Stock compensation failed; manual reconciliation required"
                );
                return AppError::compensation_failed(original.message.clone(), comp.message);
            }
        }
        if !applied.is_empty() {
            tracing::warn!(
                reversed = applied.len(),
                error = %original.message,
                "Reversed partial stock changes after write failure"
            );
        }
        original
    }

    /// Allocate the next sequential order number
    pub(crate) fn next_order_number(&self) -> AppResult<String> {
        let mut counters: Counters = self.store.load(COUNTERS)?;
        counters.order_seq += 1;
        self.store.save(COUNTERS, &counters)?;
        Ok(format!("RX-{:06}", counters.order_seq))
    }
}
