//! Request/response API boundary
//!
//! The surface consumed by UI code and tests. Every call returns a
//! self-describing response record carrying a status tag, a display-safe
//! message, and a timestamp, never an error. Internal failures are
//! converted into `error`-status responses so callers branch on the tag,
//! not on exception handling.

use crate::ledger::{self, RequestedItem, StockCheck};
use crate::orders::OrderEngine;
use crate::report::{self, DateRange, OrderStatistics, StockReport, StockReportFilters};
use crate::store::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{OrderCreate, StockChange};
use shared::types::{ResponseStatus, SessionContext};
use std::sync::Arc;

/// Response to `create_order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub status: ResponseStatus,
    pub order_id: Option<String>,
    pub order_number: Option<String>,
    pub stock_changes: Vec<StockChange>,
    pub errors: Vec<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Response to `cancel_order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrderResponse {
    pub status: ResponseStatus,
    pub order_id: String,
    pub stock_changes: Vec<StockChange>,
    pub errors: Vec<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Response to `simulate_order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateOrderResponse {
    pub status: ResponseStatus,
    pub can_proceed: bool,
    pub stock_checks: Vec<StockCheck>,
    pub errors: Vec<String>,
    pub total_items_requested: i64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Response to `check_stock`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckStockResponse {
    pub status: ResponseStatus,
    pub is_available: bool,
    pub stock_checks: Vec<StockCheck>,
    pub errors: Vec<String>,
    pub total_items_requested: i64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Response to `stock_report`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReportResponse {
    pub status: ResponseStatus,
    pub report: Option<StockReport>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Response to `order_statistics`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatisticsResponse {
    pub status: ResponseStatus,
    pub statistics: Option<OrderStatistics>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// The engine's request/response facade
pub struct EngineApi {
    engine: OrderEngine,
    store: Arc<dyn RecordStore>,
}

impl EngineApi {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            engine: OrderEngine::new(store.clone()),
            store,
        }
    }

    pub fn engine(&self) -> &OrderEngine {
        &self.engine
    }

    /// Create an order; stock and order record move together or not at all
    pub fn create_order(&self, ctx: &SessionContext, input: OrderCreate) -> CreateOrderResponse {
        match self.engine.create_order(ctx, input) {
            Ok(created) => CreateOrderResponse {
                status: ResponseStatus::Success,
                message: format!("Order {} created", created.order_number),
                order_id: Some(created.order_id),
                order_number: Some(created.order_number),
                stock_changes: created.stock_changes,
                errors: Vec::new(),
                timestamp: Utc::now(),
            },
            Err(e) => CreateOrderResponse {
                status: ResponseStatus::Error,
                order_id: None,
                order_number: None,
                stock_changes: Vec::new(),
                errors: e.error_list(),
                message: e.message,
                timestamp: Utc::now(),
            },
        }
    }

    /// Cancel an order and restore its stock
    pub fn cancel_order(
        &self,
        ctx: &SessionContext,
        order_id: &str,
        reason: Option<String>,
    ) -> CancelOrderResponse {
        match self.engine.cancel_order(ctx, order_id, reason) {
            Ok(cancelled) => CancelOrderResponse {
                status: ResponseStatus::Success,
                order_id: cancelled.order_id,
                stock_changes: cancelled.stock_changes,
                errors: Vec::new(),
                message: "Order cancelled and stock restored".to_string(),
                timestamp: Utc::now(),
            },
            Err(e) => CancelOrderResponse {
                status: ResponseStatus::Error,
                order_id: order_id.to_string(),
                stock_changes: Vec::new(),
                errors: e.error_list(),
                message: e.message,
                timestamp: Utc::now(),
            },
        }
    }

    /// Pre-flight a cart without committing anything
    pub fn simulate_order(&self, items: &[RequestedItem]) -> SimulateOrderResponse {
        match self.engine.simulate_order(items) {
            Ok(sim) => SimulateOrderResponse {
                status: if sim.can_proceed {
                    ResponseStatus::Success
                } else {
                    ResponseStatus::Warning
                },
                message: if sim.can_proceed {
                    "All items are available".to_string()
                } else {
                    "Some items are unavailable".to_string()
                },
                can_proceed: sim.can_proceed,
                stock_checks: sim.stock_checks,
                errors: sim.errors,
                total_items_requested: sim.total_items_requested,
                timestamp: Utc::now(),
            },
            Err(e) => SimulateOrderResponse {
                status: ResponseStatus::Error,
                can_proceed: false,
                stock_checks: Vec::new(),
                errors: e.error_list(),
                total_items_requested: ledger::total_requested(items),
                message: e.message,
                timestamp: Utc::now(),
            },
        }
    }

    /// Check stock availability for a set of items
    pub fn check_stock(&self, items: &[RequestedItem]) -> CheckStockResponse {
        match self.engine.check_stock(items) {
            Ok(outcome) => CheckStockResponse {
                status: if outcome.result.is_available {
                    ResponseStatus::Success
                } else {
                    ResponseStatus::Warning
                },
                message: if outcome.result.is_available {
                    "All items are available".to_string()
                } else {
                    "Some items are unavailable".to_string()
                },
                is_available: outcome.result.is_available,
                stock_checks: outcome.result.checks,
                errors: outcome.result.errors,
                total_items_requested: outcome.total_items_requested,
                timestamp: Utc::now(),
            },
            Err(e) => CheckStockResponse {
                status: ResponseStatus::Error,
                is_available: false,
                stock_checks: Vec::new(),
                errors: e.error_list(),
                total_items_requested: ledger::total_requested(items),
                message: e.message,
                timestamp: Utc::now(),
            },
        }
    }

    /// Produce a stock report for dashboards
    pub fn stock_report(&self, filters: Option<StockReportFilters>) -> StockReportResponse {
        let filters = filters.unwrap_or_default();
        match report::stock_report(self.store.as_ref(), &filters) {
            Ok(stock) => StockReportResponse {
                status: ResponseStatus::Success,
                message: format!("{} products in report", stock.products.len()),
                report: Some(stock),
                timestamp: Utc::now(),
            },
            Err(e) => StockReportResponse {
                status: ResponseStatus::Error,
                report: None,
                message: e.message,
                timestamp: Utc::now(),
            },
        }
    }

    /// Aggregate order statistics over a date range
    pub fn order_statistics(&self, range: Option<DateRange>) -> OrderStatisticsResponse {
        let range = range.unwrap_or_default();
        match report::order_statistics(self.store.as_ref(), &range) {
            Ok(stats) => OrderStatisticsResponse {
                status: ResponseStatus::Success,
                message: format!("{} orders in range", stats.total_orders),
                statistics: Some(stats),
                timestamp: Utc::now(),
            },
            Err(e) => OrderStatisticsResponse {
                status: ResponseStatus::Error,
                statistics: None,
                message: e.message,
                timestamp: Utc::now(),
            },
        }
    }
}
