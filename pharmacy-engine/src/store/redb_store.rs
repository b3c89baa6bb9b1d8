//! redb-backed record store
//!
//! One table maps collection name to a JSON-serialized record list. The
//! embedded database gives durable, whole-payload writes per collection
//! but deliberately nothing stronger: the [`RecordStore`] contract stays
//! last-writer-wins across sessions.

use super::RecordStore;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::error::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

/// Table for collections: key = collection name, value = JSON payload
const COLLECTIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");

/// Durable [`RecordStore`] backed by an embedded redb database
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) the store at the given path
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let db = Database::create(path)
            .map_err(|e| AppError::internal(format!("Failed to open record store: {}", e)))?;

        // Create the table up front so reads never race table creation
        let write_txn = db
            .begin_write()
            .map_err(|e| AppError::internal(format!("Failed to initialize record store: {}", e)))?;
        {
            let _ = write_txn
                .open_table(COLLECTIONS_TABLE)
                .map_err(|e| AppError::internal(format!("Failed to create table: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| AppError::internal(format!("Failed to initialize record store: {}", e)))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl RecordStore for RedbStore {
    fn get_raw(&self, collection: &str) -> AppResult<Option<Vec<u8>>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| AppError::internal(format!("Record store read failed: {}", e)))?;
        let table = read_txn
            .open_table(COLLECTIONS_TABLE)
            .map_err(|e| AppError::internal(format!("Record store read failed: {}", e)))?;
        let value = table
            .get(collection)
            .map_err(|e| AppError::internal(format!("Record store read failed: {}", e)))?
            .map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn put_raw(&self, collection: &str, payload: Vec<u8>) -> AppResult<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| AppError::storage_write(format!("Record store write failed: {}", e)))?;
        {
            let mut table = write_txn
                .open_table(COLLECTIONS_TABLE)
                .map_err(|e| AppError::storage_write(format!("Record store write failed: {}", e)))?;
            table
                .insert(collection, payload.as_slice())
                .map_err(|e| AppError::storage_write(format!("Record store write failed: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| AppError::storage_write(format!("Record store write failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Counters, StoreExt, COUNTERS};

    #[test]
    fn test_open_write_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("records.redb")).unwrap();
        assert_eq!(store.get_raw(COUNTERS).unwrap(), None);
        store.save(COUNTERS, &Counters { order_seq: 7 }).unwrap();
        let counters: Counters = store.load(COUNTERS).unwrap();
        assert_eq!(counters.order_seq, 7);
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.save(COUNTERS, &Counters { order_seq: 3 }).unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        let counters: Counters = store.load(COUNTERS).unwrap();
        assert_eq!(counters.order_seq, 3);
    }
}
