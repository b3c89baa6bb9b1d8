//! Order creation
//!
//! Validate the payload, check availability, apply stock deltas, then
//! persist the pending order, in that sequence, so a failed store write
//! can still be compensated before any order record exists.

use super::{OrderEngine, MONEY_TOLERANCE};
use crate::ledger::{self, RequestedItem};
use crate::store::{StoreExt, ORDERS, PRODUCTS};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::models::{Order, OrderCreate, OrderStatus, Product, StockChange};
use shared::types::SessionContext;
use uuid::Uuid;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Result of a successful order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub order_id: String,
    pub order_number: String,
    pub stock_changes: Vec<StockChange>,
}

impl OrderEngine {
    /// Create an order and decrement stock, all-or-nothing
    ///
    /// Sequence:
    /// 1. Validate the payload shape; a malformed payload has no side effects.
    /// 2. Check availability over all items; any failing item aborts with the
    ///    full per-item error list and no stock touched.
    /// 3. Apply one stock delta per distinct product, compensating partial
    ///    application if a write fails mid-sequence.
    /// 4. Persist the order as `pending` with a fresh id, a sequential order
    ///    number, and the recorded stock changes.
    pub fn create_order(
        &self,
        ctx: &SessionContext,
        input: OrderCreate,
    ) -> AppResult<CreatedOrder> {
        validate_order_input(&input)?;

        let requested: Vec<RequestedItem> = input
            .items
            .iter()
            .map(|i| RequestedItem::new(i.product_id.clone(), i.quantity))
            .collect();

        let products: Vec<Product> = self.store().load(PRODUCTS)?;
        let check = ledger::check_availability(&products, &requested);
        if !check.is_available {
            return Err(
                AppError::insufficient_stock("One or more items are unavailable")
                    .with_errors(check.errors),
            );
        }

        // Stock moves before the order record exists; every failure path
        // below must undo the applied deltas.
        let deltas = ledger::application_deltas(&requested);
        let stock_changes = self.apply_deltas(&deltas)?;

        let order_number = match self.next_order_number() {
            Ok(n) => n,
            Err(e) => return Err(self.compensate(&stock_changes, e)),
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: order_number.clone(),
            customer_id: input.customer_id,
            pharmacy_id: input.pharmacy_id,
            items: input.items,
            total: input.total,
            status: OrderStatus::Pending,
            stock_changes: stock_changes.clone(),
            delivery_address: input.delivery_address,
            created_at: Utc::now(),
            cancelled_at: None,
            cancel_reason: None,
        };

        let mut orders: Vec<Order> = match self.store().load(ORDERS) {
            Ok(orders) => orders,
            Err(e) => return Err(self.compensate(&stock_changes, e)),
        };
        let order_id = order.id.clone();
        orders.push(order);
        if let Err(e) = self.store().save(ORDERS, &orders) {
            return Err(self.compensate(&stock_changes, e));
        }

        tracing::info!(
            order_id = %order_id,
            order_number = %order_number,
            user_id = %ctx.user_id,
            products = stock_changes.len(),
            "Order created"
        );

        Ok(CreatedOrder {
            order_id,
            order_number,
            stock_changes,
        })
    }
}

/// Validate payload shape and total reconciliation; no side effects
fn validate_order_input(input: &OrderCreate) -> AppResult<()> {
    let mut errors = Vec::new();
    if let Err(validation) = input.validate() {
        flatten_validation_errors(&validation, &mut errors);
    }

    let line_total: Decimal = input
        .items
        .iter()
        .map(|i| i.price * Decimal::from(i.quantity))
        .sum();
    if (line_total - input.total).abs() > MONEY_TOLERANCE {
        errors.push(format!(
            "Order total {} does not reconcile with item lines ({})",
            input.total, line_total
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation("Order data is invalid").with_errors(errors))
    }
}

/// Collect every field and nested-struct validation message into one list
fn flatten_validation_errors(validation: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in validation.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    match &error.message {
                        Some(message) => out.push(message.to_string()),
                        None => out.push(format!("{} is invalid", field)),
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten_validation_errors(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    flatten_validation_errors(nested, out);
                }
            }
        }
    }
}
