//! Inventory report and order statistics
//!
//! Read-only aggregation over the products and orders collections for
//! dashboards. Monetary rounding to two digits happens here, at report
//! time; stock arithmetic elsewhere stays integer-exact.

use crate::store::{RecordStore, StoreExt, ORDERS, PRODUCTS};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::AppResult;
use shared::models::{Order, OrderStatus, Product};

/// Low-stock flag threshold used when a report does not supply one
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Stock report filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockReportFilters {
    pub pharmacy_id: Option<String>,
    pub active: Option<bool>,
    pub low_stock_threshold: Option<i64>,
}

/// One product line in a stock report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReportLine {
    pub id: String,
    pub name: String,
    pub stock: i64,
    pub is_active: bool,
    /// Stock at or below the report threshold
    pub low_stock: bool,
}

/// Stock report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReport {
    pub threshold: i64,
    pub products: Vec<StockReportLine>,
}

/// Inclusive date range; open-ended when a bound is omitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if at > end {
                return false;
            }
        }
        true
    }
}

/// Order counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub accepted: u64,
    pub ready: u64,
    pub delivered: u64,
    pub cancelled: u64,
    pub rejected: u64,
}

impl StatusCounts {
    fn record(&mut self, status: OrderStatus) {
        match status {
            OrderStatus::Pending => self.pending += 1,
            OrderStatus::Accepted => self.accepted += 1,
            OrderStatus::Ready => self.ready += 1,
            OrderStatus::Delivered => self.delivered += 1,
            OrderStatus::Cancelled => self.cancelled += 1,
            OrderStatus::Rejected => self.rejected += 1,
        }
    }
}

/// Aggregated order statistics over a date range
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderStatistics {
    pub total_orders: u64,
    pub by_status: StatusCounts,
    /// Sum of totals over non-cancelled orders, rounded to two digits
    pub revenue: Decimal,
}

/// Produce a stock report over matching products
pub fn stock_report(
    store: &dyn RecordStore,
    filters: &StockReportFilters,
) -> AppResult<StockReport> {
    let threshold = filters
        .low_stock_threshold
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let products: Vec<Product> = store.load(PRODUCTS)?;

    let lines = products
        .iter()
        .filter(|p| {
            filters
                .pharmacy_id
                .as_ref()
                .is_none_or(|id| &p.pharmacy_id == id)
        })
        .filter(|p| filters.active.is_none_or(|active| p.is_active == active))
        .map(|p| StockReportLine {
            id: p.id.clone(),
            name: p.name.clone(),
            stock: p.stock,
            is_active: p.is_active,
            low_stock: p.stock <= threshold,
        })
        .collect();

    Ok(StockReport {
        threshold,
        products: lines,
    })
}

/// Aggregate order counts and revenue over an inclusive date range
///
/// A range with no matching orders yields zeroed aggregates.
pub fn order_statistics(store: &dyn RecordStore, range: &DateRange) -> AppResult<OrderStatistics> {
    let orders: Vec<Order> = store.load(ORDERS)?;
    let mut stats = OrderStatistics::default();

    for order in orders.iter().filter(|o| range.contains(o.created_at)) {
        stats.total_orders += 1;
        stats.by_status.record(order.status);
        if order.status != OrderStatus::Cancelled {
            stats.revenue += order.total;
        }
    }

    stats.revenue = stats.revenue.round_dp(2);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use shared::models::DeliveryAddress;

    fn create_test_product(id: &str, stock: i64, pharmacy_id: &str, is_active: bool) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Decimal::new(999, 2),
            stock,
            category: "otc".to_string(),
            requires_prescription: false,
            pharmacy_id: pharmacy_id.to_string(),
            is_active,
        }
    }

    fn create_test_order(status: OrderStatus, total: Decimal, created_at: DateTime<Utc>) -> Order {
        Order {
            id: format!("ord-{:?}-{}", status, created_at.timestamp()),
            order_number: "RX-000001".to_string(),
            customer_id: "cust-1".to_string(),
            pharmacy_id: "ph-1".to_string(),
            items: vec![],
            total,
            status,
            stock_changes: vec![],
            delivery_address: DeliveryAddress {
                street: "12 High Street".to_string(),
                city: "Lisbon".to_string(),
                postal_code: "1000-001".to_string(),
                phone: None,
            },
            created_at,
            cancelled_at: None,
            cancel_reason: None,
        }
    }

    #[test]
    fn test_low_stock_flag_uses_default_threshold() {
        let store = MemoryStore::new();
        store
            .save(
                PRODUCTS,
                &vec![
                    create_test_product("p1", 3, "ph-1", true),
                    create_test_product("p2", 6, "ph-1", true),
                ],
            )
            .unwrap();

        let report = stock_report(&store, &StockReportFilters::default()).unwrap();
        assert_eq!(report.threshold, DEFAULT_LOW_STOCK_THRESHOLD);
        assert!(report.products[0].low_stock);
        assert!(!report.products[1].low_stock);
    }

    #[test]
    fn test_filters_by_pharmacy_and_active() {
        let store = MemoryStore::new();
        store
            .save(
                PRODUCTS,
                &vec![
                    create_test_product("p1", 10, "ph-1", true),
                    create_test_product("p2", 10, "ph-2", true),
                    create_test_product("p3", 10, "ph-1", false),
                ],
            )
            .unwrap();

        let report = stock_report(
            &store,
            &StockReportFilters {
                pharmacy_id: Some("ph-1".to_string()),
                active: Some(true),
                low_stock_threshold: None,
            },
        )
        .unwrap();
        assert_eq!(report.products.len(), 1);
        assert_eq!(report.products[0].id, "p1");
    }

    #[test]
    fn test_statistics_group_by_status_and_skip_cancelled_revenue() {
        let store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        store
            .save(
                ORDERS,
                &vec![
                    create_test_order(OrderStatus::Pending, Decimal::new(1000, 2), at),
                    create_test_order(OrderStatus::Delivered, Decimal::new(2550, 2), at),
                    create_test_order(OrderStatus::Cancelled, Decimal::new(9900, 2), at),
                ],
            )
            .unwrap();

        let stats = order_statistics(&store, &DateRange::default()).unwrap();
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.by_status.pending, 1);
        assert_eq!(stats.by_status.delivered, 1);
        assert_eq!(stats.by_status.cancelled, 1);
        assert_eq!(stats.revenue, Decimal::new(3550, 2));
    }

    #[test]
    fn test_statistics_range_is_inclusive() {
        let store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        store
            .save(
                ORDERS,
                &vec![create_test_order(
                    OrderStatus::Pending,
                    Decimal::new(1000, 2),
                    at,
                )],
            )
            .unwrap();

        let exact = DateRange {
            start: Some(at),
            end: Some(at),
        };
        assert_eq!(order_statistics(&store, &exact).unwrap().total_orders, 1);

        let before = DateRange {
            start: None,
            end: Some(at - chrono::Duration::seconds(1)),
        };
        assert_eq!(order_statistics(&store, &before).unwrap().total_orders, 0);
    }

    #[test]
    fn test_empty_period_yields_zeroed_aggregates() {
        let store = MemoryStore::new();
        let stats = order_statistics(&store, &DateRange::default()).unwrap();
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.by_status, StatusCounts::default());
        assert_eq!(stats.revenue, Decimal::ZERO);
    }
}
