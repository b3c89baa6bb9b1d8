//! End-to-end order lifecycle through the request/response API
//!
//! Exercises the reconciliation invariants: stock never double-moves, an
//! order's items and stock effects travel together or not at all, and a
//! cancellation restores stock exactly once.

use pharmacy_engine::ledger::RequestedItem;
use pharmacy_engine::report::DateRange;
use pharmacy_engine::store::{MemoryStore, StoreExt, ORDERS, PRODUCTS};
use pharmacy_engine::EngineApi;
use rust_decimal::Decimal;
use shared::models::{DeliveryAddress, Order, OrderCreate, OrderItem, OrderStatus, Product};
use shared::types::{ResponseStatus, SessionContext, UserRole};
use std::sync::Arc;

fn product(id: &str, name: &str, stock: i64, price_cents: i64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Decimal::new(price_cents, 2),
        stock,
        category: "otc".to_string(),
        requires_prescription: false,
        pharmacy_id: "ph-1".to_string(),
        is_active: true,
    }
}

fn address() -> DeliveryAddress {
    DeliveryAddress {
        street: "12 High Street".to_string(),
        city: "Lisbon".to_string(),
        postal_code: "1000-001".to_string(),
        phone: Some("+351 210 000 000".to_string()),
    }
}

fn order_input(items: Vec<OrderItem>) -> OrderCreate {
    let total = items
        .iter()
        .map(|i| i.price * Decimal::from(i.quantity))
        .sum();
    OrderCreate {
        customer_id: "cust-1".to_string(),
        pharmacy_id: "ph-1".to_string(),
        items,
        delivery_address: address(),
        total,
    }
}

fn item(product_id: &str, quantity: i64, price_cents: i64) -> OrderItem {
    OrderItem {
        product_id: product_id.to_string(),
        name: product_id.to_string(),
        price: Decimal::new(price_cents, 2),
        quantity,
    }
}

fn ctx() -> SessionContext {
    SessionContext::new("cust-1", UserRole::Customer)
}

fn stock_of(store: &MemoryStore, product_id: &str) -> i64 {
    let products: Vec<Product> = store.load(PRODUCTS).unwrap();
    products
        .iter()
        .find(|p| p.id == product_id)
        .map(|p| p.stock)
        .unwrap()
}

fn setup(products: Vec<Product>) -> (EngineApi, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.save(PRODUCTS, &products).unwrap();
    (EngineApi::new(store.clone()), store)
}

#[test]
fn create_then_cancel_round_trips_stock_exactly() {
    let (api, store) = setup(vec![product("p1", "Paracetamol", 10, 500)]);

    let created = api.create_order(&ctx(), order_input(vec![item("p1", 3, 500)]));
    assert_eq!(created.status, ResponseStatus::Success);
    assert_eq!(stock_of(&store, "p1"), 7);
    assert_eq!(created.stock_changes.len(), 1);
    assert_eq!(created.stock_changes[0].previous_stock, 10);
    assert_eq!(created.stock_changes[0].new_stock, 7);
    assert_eq!(created.stock_changes[0].delta, -3);

    let order_id = created.order_id.unwrap();
    let cancelled = api.cancel_order(&ctx(), &order_id, Some("customer request".to_string()));
    assert_eq!(cancelled.status, ResponseStatus::Success);
    assert_eq!(stock_of(&store, "p1"), 10);

    let orders: Vec<Order> = store.load(ORDERS).unwrap();
    assert_eq!(orders[0].status, OrderStatus::Cancelled);
    assert_eq!(orders[0].cancel_reason.as_deref(), Some("customer request"));
    // creation entry and reversal entry for the same product
    assert_eq!(orders[0].stock_changes.len(), 2);
    assert_eq!(orders[0].stock_changes[0].delta, -3);
    assert_eq!(orders[0].stock_changes[1].delta, 3);
}

#[test]
fn repeated_cancel_returns_error_without_restoring_again() {
    let (api, store) = setup(vec![product("p1", "Paracetamol", 10, 500)]);
    let created = api.create_order(&ctx(), order_input(vec![item("p1", 3, 500)]));
    let order_id = created.order_id.unwrap();

    api.cancel_order(&ctx(), &order_id, None);
    assert_eq!(stock_of(&store, "p1"), 10);

    let second = api.cancel_order(&ctx(), &order_id, None);
    assert_eq!(second.status, ResponseStatus::Error);
    assert!(second.stock_changes.is_empty());
    // 10, not 13
    assert_eq!(stock_of(&store, "p1"), 10);
}

#[test]
fn insufficient_stock_leaves_everything_untouched() {
    let (api, store) = setup(vec![product("p1", "Paracetamol", 2, 500)]);

    let response = api.create_order(&ctx(), order_input(vec![item("p1", 5, 500)]));
    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.errors, vec!["Paracetamol: requested 5, available 2"]);
    assert_eq!(stock_of(&store, "p1"), 2);

    let orders: Vec<Order> = store.load(ORDERS).unwrap();
    assert!(orders.is_empty());
}

#[test]
fn partial_failure_in_multi_item_order_is_all_or_nothing() {
    let (api, store) = setup(vec![
        product("p1", "Paracetamol", 10, 500),
        product("p2", "Ibuprofen", 1, 750),
        product("p3", "Vitamin C", 8, 300),
    ]);

    let response = api.create_order(
        &ctx(),
        order_input(vec![
            item("p1", 2, 500),
            item("p2", 4, 750),
            item("p3", 1, 300),
        ]),
    );
    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(stock_of(&store, "p1"), 10);
    assert_eq!(stock_of(&store, "p2"), 1);
    assert_eq!(stock_of(&store, "p3"), 8);
}

#[test]
fn duplicate_product_lines_adjust_stock_once() {
    let (api, store) = setup(vec![product("p1", "Paracetamol", 10, 500)]);

    let response = api.create_order(
        &ctx(),
        order_input(vec![item("p1", 2, 500), item("p1", 3, 500)]),
    );
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.stock_changes.len(), 1);
    assert_eq!(response.stock_changes[0].delta, -5);
    assert_eq!(stock_of(&store, "p1"), 5);
}

#[test]
fn injected_write_failure_triggers_compensation() {
    let (api, store) = setup(vec![
        product("p1", "Paracetamol", 10, 500),
        product("p2", "Ibuprofen", 6, 750),
    ]);

    // the order persist fails after stock was applied
    store.fail_next_write(ORDERS);
    let response = api.create_order(
        &ctx(),
        order_input(vec![item("p1", 2, 500), item("p2", 3, 750)]),
    );
    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(stock_of(&store, "p1"), 10);
    assert_eq!(stock_of(&store, "p2"), 6);
    let orders: Vec<Order> = store.load(ORDERS).unwrap();
    assert!(orders.is_empty());

    // the store recovered; the same order now succeeds
    let retry = api.create_order(
        &ctx(),
        order_input(vec![item("p1", 2, 500), item("p2", 3, 750)]),
    );
    assert_eq!(retry.status, ResponseStatus::Success);
    assert_eq!(stock_of(&store, "p1"), 8);
    assert_eq!(stock_of(&store, "p2"), 3);
}

#[test]
fn simulate_is_read_only_and_matches_check_stock() {
    let (api, store) = setup(vec![product("p1", "Paracetamol", 4, 500)]);
    let items = [
        RequestedItem::new("p1", 2),
        RequestedItem::new("p1", 3),
    ];

    let simulate = api.simulate_order(&items);
    assert_eq!(simulate.status, ResponseStatus::Warning);
    assert!(!simulate.can_proceed);
    assert_eq!(simulate.total_items_requested, 5);
    // combined duplicate check: one entry for p1 with requested 5
    assert_eq!(simulate.stock_checks.len(), 1);
    assert_eq!(simulate.stock_checks[0].requested, 5);
    assert_eq!(stock_of(&store, "p1"), 4);

    let check = api.check_stock(&items);
    assert_eq!(check.is_available, simulate.can_proceed);
    assert_eq!(check.errors, simulate.errors);
}

#[test]
fn statistics_reflect_the_lifecycle() {
    let (api, _store) = setup(vec![product("p1", "Paracetamol", 20, 500)]);

    let first = api.create_order(&ctx(), order_input(vec![item("p1", 2, 500)]));
    api.create_order(&ctx(), order_input(vec![item("p1", 1, 500)]));
    api.cancel_order(&ctx(), &first.order_id.unwrap(), None);

    let stats = api.order_statistics(Some(DateRange::default()));
    assert_eq!(stats.status, ResponseStatus::Success);
    let stats = stats.statistics.unwrap();
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.by_status.cancelled, 1);
    assert_eq!(stats.by_status.pending, 1);
    // cancelled order excluded from revenue
    assert_eq!(stats.revenue, Decimal::new(500, 2));
}

#[test]
fn order_numbers_stay_sequential_across_orders() {
    let (api, _store) = setup(vec![product("p1", "Paracetamol", 20, 500)]);
    let a = api.create_order(&ctx(), order_input(vec![item("p1", 1, 500)]));
    let b = api.create_order(&ctx(), order_input(vec![item("p1", 1, 500)]));
    assert_eq!(a.order_number.as_deref(), Some("RX-000001"));
    assert_eq!(b.order_number.as_deref(), Some("RX-000002"));
}
