//! Order cancellation
//!
//! Reverses the creation-time stock deltas, appends reversal entries to
//! the order's change log, and stamps the cancellation. Cancellation is
//! deliberately not idempotent: stock must only ever be restored once, so
//! a repeated cancel is an error, not a no-op.

use super::OrderEngine;
use crate::ledger;
use crate::notify::{self, NewNotification};
use crate::store::{StoreExt, ORDERS};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::models::{NotificationKind, Order, OrderStatus, StockChange};
use shared::types::SessionContext;

/// Result of a successful cancellation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelledOrder {
    pub order_id: String,
    /// Reversal entries appended to the order's change log
    pub stock_changes: Vec<StockChange>,
}

impl OrderEngine {
    /// Cancel an order and restore its stock
    ///
    /// Reversal deltas come from the order's recorded stock changes, not
    /// its current item list, so later catalog edits cannot skew the
    /// restore. Fails with `OrderNotFound` for an unknown id and
    /// `OrderAlreadyTerminal` when the order is already cancelled or
    /// delivered.
    pub fn cancel_order(
        &self,
        ctx: &SessionContext,
        order_id: &str,
        reason: Option<String>,
    ) -> AppResult<CancelledOrder> {
        let mut orders: Vec<Order> = self.store().load(ORDERS)?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| AppError::order_not_found(order_id))?;

        if order.status.is_terminal() {
            return Err(AppError::already_terminal(format!(
                "Order {} is already {:?}; stock is only restored once",
                order.order_number, order.status
            )));
        }

        let deltas = ledger::reversal_deltas(&order.stock_changes);
        let reversals = self.apply_deltas(&deltas)?;

        order.stock_changes.extend(reversals.iter().cloned());
        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(Utc::now());
        order.cancel_reason = reason.clone();

        let order_number = order.order_number.clone();
        let counterpart = if ctx.user_id == order.customer_id {
            order.pharmacy_id.clone()
        } else {
            order.customer_id.clone()
        };

        if let Err(e) = self.store().save(ORDERS, &orders) {
            return Err(self.compensate(&reversals, e));
        }

        tracing::info!(
            order_id = %order_id,
            order_number = %order_number,
            user_id = %ctx.user_id,
            reason = reason.as_deref().unwrap_or("-"),
            "Order cancelled, stock restored"
        );

        // Tell the other side of the order; a lost notification does not
        // invalidate the cancellation itself.
        let notification = NewNotification {
            target_user_id: counterpart,
            kind: NotificationKind::OrderCancelled,
            title: "Order cancelled".to_string(),
            message: match &reason {
                Some(r) => format!("Order {} was cancelled: {}", order_number, r),
                None => format!("Order {} was cancelled", order_number),
            },
            order_id: Some(order_id.to_string()),
            sender_id: Some(ctx.user_id.clone()),
            sender_role: Some(ctx.role),
        };
        if let Err(e) = notify::create_notification(self.store().as_ref(), notification) {
            tracing::warn!(order_id = %order_id, error = %e, "Failed to append cancellation notification");
        }

        Ok(CancelledOrder {
            order_id: order_id.to_string(),
            stock_changes: reversals,
        })
    }
}
