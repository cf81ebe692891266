//! Pluggable lock tables.
//!
//! A lock table maps a collection name to the [`CollectionLock`] that
//! serializes writes and deletes in that collection. Implement [`LockTable`] to
//! bring your own concurrent map.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Exclusive lock guarding mutations of one collection.
pub type CollectionLock = Mutex<()>;

/// Trait that a concurrent map must satisfy to hold a driver's collection locks.
///
/// Entries are only ever added. The driver serializes calls to
/// [`insert`](LockTable::insert) itself, so an implementation only has to make
/// `get` safe to call concurrently with one inserter.
pub trait LockTable: Send + Sync {
    /// Look up the lock for `collection`.
    fn get(&self, collection: &str) -> Option<Arc<CollectionLock>>;

    /// Register a fresh lock for `collection` and return the shared handle.
    fn insert(&self, collection: String) -> Arc<CollectionLock>;

    /// Number of registered collections. Shown in the driver's `Debug` output.
    fn table_len(&self) -> usize;
}

// ---- RwLock<HashMap> ---------------------------------------------------------

impl LockTable for parking_lot::RwLock<HashMap<String, Arc<CollectionLock>>> {
    fn get(&self, collection: &str) -> Option<Arc<CollectionLock>> {
        self.read().get(collection).cloned()
    }

    fn insert(&self, collection: String) -> Arc<CollectionLock> {
        Arc::clone(
            self.write()
                .entry(collection)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    fn table_len(&self) -> usize {
        self.read().len()
    }
}

// ---- DashMap -----------------------------------------------------------------

// The entry guard holds the shard lock, so the Arc handed back is the one
// stored in the map.
impl LockTable for dashmap::DashMap<String, Arc<CollectionLock>> {
    fn get(&self, collection: &str) -> Option<Arc<CollectionLock>> {
        dashmap::DashMap::get(self, collection).map(|r| Arc::clone(r.value()))
    }

    fn insert(&self, collection: String) -> Arc<CollectionLock> {
        Arc::clone(
            self.entry(collection)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    fn table_len(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;
    use parking_lot::RwLock;

    fn same_lock_after_insert<T: LockTable>(table: T) {
        assert!(table.get("users").is_none());
        let a = table.insert("users".into());
        let b = table.get("users").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(table.table_len(), 1);

        table.insert("orders".into());
        assert_eq!(table.table_len(), 2);
        assert!(!Arc::ptr_eq(&a, &table.get("orders").unwrap()));
    }

    #[test]
    fn dashmap_table() {
        same_lock_after_insert(DashMap::<String, Arc<CollectionLock>>::new());
    }

    #[test]
    fn rwlock_table() {
        same_lock_after_insert(RwLock::new(HashMap::<String, Arc<CollectionLock>>::new()));
    }
}
