//! Record store abstraction
//!
//! The engine persists every collection (products, orders, notifications,
//! carts, counters) through a deliberately narrow contract: whole-collection
//! get/set of serialized records, nothing else. There are no partial
//! updates, no transactions, and no optimistic versioning.
//!
//! # Cross-session semantics
//!
//! Several independent sessions may read-modify-write the same collection
//! concurrently. The storage layer resolves that as last-writer-wins; the
//! engine compensates only for intra-call atomicity (reversing its own
//! partial stock writes within one operation). Two sessions racing on the
//! same product's stock can both pass an availability check against stale
//! stock and both decrement. That residual race is a known property of
//! this architecture, to be revisited when a server-authoritative backing
//! store exists.

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::error::{AppError, AppResult};

/// Collection key for products
pub const PRODUCTS: &str = "products";
/// Collection key for orders
pub const ORDERS: &str = "orders";
/// Collection key for the shared notification list
pub const NOTIFICATIONS: &str = "notifications";
/// Collection key for cart entries
pub const CARTS: &str = "carts";
/// Collection key for sequence counters
pub const COUNTERS: &str = "counters";

/// Sequence counters persisted alongside the business collections
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Counters {
    /// Next order number is derived from this sequence
    pub order_seq: u64,
}

/// Whole-collection key-value store
///
/// Implementations only promise that a single `put_raw` is applied in full;
/// interleaved calls from other sessions follow last-writer-wins.
pub trait RecordStore: Send + Sync {
    /// Read a collection's raw serialized payload, `None` if never written
    fn get_raw(&self, collection: &str) -> AppResult<Option<Vec<u8>>>;

    /// Replace a collection's payload in full
    fn put_raw(&self, collection: &str, payload: Vec<u8>) -> AppResult<()>;
}

/// Typed load/save helpers over [`RecordStore`]
pub trait StoreExt: RecordStore {
    /// Load a collection, falling back to its default when never written
    fn load<T>(&self, collection: &str) -> AppResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.get_raw(collection)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::internal(format!(
                    "Corrupt payload in collection {}: {}",
                    collection, e
                ))
            }),
            None => Ok(T::default()),
        }
    }

    /// Serialize and write a collection in full
    fn save<T>(&self, collection: &str, value: &T) -> AppResult<()>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| AppError::internal(format!("Serialization failed: {}", e)))?;
        self.put_raw(collection, bytes)
    }
}

impl<S: RecordStore + ?Sized> StoreExt for S {}
