//! In-memory record store
//!
//! Backs tests, the inventory self-check, and in-process demos. Supports
//! scripted write-failure injection so compensation paths can be
//! exercised without a faulty disk.

use super::RecordStore;
use parking_lot::RwLock;
use shared::error::{AppError, AppResult};
use std::collections::HashMap;

/// Scripted failure for one collection's writes
#[derive(Debug, Clone)]
struct FailurePlan {
    /// Successful writes to allow before failing
    allow: u32,
    /// Failures to produce once triggered; `None` fails forever
    failures: Option<u32>,
}

/// Map-backed [`RecordStore`]
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<u8>>>,
    failure_plans: RwLock<HashMap<String, FailurePlan>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next write to `collection` fail once, then succeed again
    pub fn fail_next_write(&self, collection: &str) {
        self.failure_plans.write().insert(
            collection.to_string(),
            FailurePlan {
                allow: 0,
                failures: Some(1),
            },
        );
    }

    /// Make every write to `collection` fail until plans are cleared
    pub fn fail_all_writes(&self, collection: &str) {
        self.failure_plans.write().insert(
            collection.to_string(),
            FailurePlan {
                allow: 0,
                failures: None,
            },
        );
    }

    /// Allow `allow` more successful writes to `collection`, then fail
    /// every write until plans are cleared
    pub fn fail_writes_after(&self, collection: &str, allow: u32) {
        self.failure_plans.write().insert(
            collection.to_string(),
            FailurePlan {
                allow,
                failures: None,
            },
        );
    }

    /// Drop all scripted failures
    pub fn clear_failures(&self) {
        self.failure_plans.write().clear();
    }

    fn check_plan(&self, collection: &str) -> AppResult<()> {
        let mut plans = self.failure_plans.write();
        let Some(plan) = plans.get_mut(collection) else {
            return Ok(());
        };
        if plan.allow > 0 {
            plan.allow -= 1;
            return Ok(());
        }
        match &mut plan.failures {
            Some(0) => {
                plans.remove(collection);
                Ok(())
            }
            Some(n) => {
                *n -= 1;
                Err(AppError::storage_write(format!(
                    "Injected write failure for collection {}",
                    collection
                )))
            }
            None => Err(AppError::storage_write(format!(
                "Injected write failure for collection {}",
                collection
            ))),
        }
    }
}

impl RecordStore for MemoryStore {
    fn get_raw(&self, collection: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.collections.read().get(collection).cloned())
    }

    fn put_raw(&self, collection: &str, payload: Vec<u8>) -> AppResult<()> {
        self.check_plan(collection)?;
        self.collections
            .write()
            .insert(collection.to_string(), payload);
        Ok(())
    }
}
