//! Pharmacy delivery core: order and inventory reconciliation engine and
//! cross-session notification propagator
//!
//! # Architecture
//!
//! ```text
//! pharmacy-engine/src/
//! ├── core/      # Configuration, environment setup
//! ├── store/     # Whole-collection record store (redb / in-memory)
//! ├── ledger     # Pure stock availability checks and delta computation
//! ├── orders/    # Order creation/cancellation with manual compensation
//! ├── report     # Stock report and order statistics
//! ├── selfcheck  # Inventory scenarios run against scratch data
//! ├── notify/    # Shared notification list + poll-driven propagator
//! └── api/       # Request/response boundary consumed by UI and tests
//! ```
//!
//! # Data flow
//!
//! UI action → [`api::EngineApi`] → [`orders::OrderEngine`] (reads the
//! [`ledger`], reads/writes the [`store`]) → response record → UI.
//! Independently, each session's [`notify::Propagator`] polls the store
//! on fixed intervals and raises events through its injected
//! [`notify::Notifier`].
//!
//! # Consistency model
//!
//! The record store is shared, unlocked, and poll-based: storage-level
//! conflicts resolve last-writer-wins, and the engine only guarantees
//! intra-call atomicity via compensation. See the `store` module docs for
//! the residual cross-session race this leaves open by design.

pub mod api;
pub mod core;
pub mod ledger;
pub mod notify;
pub mod orders;
pub mod report;
pub mod selfcheck;
pub mod store;

// Re-export public surface
pub use api::EngineApi;
pub use core::{setup_environment, Config};
pub use notify::{Notifier, Propagator, TracingNotifier};
pub use orders::OrderEngine;
pub use store::{MemoryStore, RecordStore, RedbStore, StoreExt};
