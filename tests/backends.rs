use dashmap::DashMap;
use json_docstore::{CollectionLock, Driver, LockTable};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

fn temp_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("json_docstore_test_{}", name));
    let _ = std::fs::remove_dir_all(&root);
    root
}

fn crud<M: LockTable>(db: &Driver<M>) {
    db.write("items", "a", &1).unwrap();
    db.write("items", "b", &2).unwrap();
    assert_eq!(db.read::<i32>("items", "a").unwrap(), 1);
    assert_eq!(db.keys("items").unwrap(), vec!["a", "b"]);
    db.delete("items", "a").unwrap();
    assert!(!db.contains("items", "a"));
    db.delete("items", "").unwrap();
    assert!(db.read_all("items").unwrap_err().is_not_found());
}

#[test]
fn dashmap_table_crud() {
    let root = temp_root("lt_dashmap");
    let db = Driver::builder(&root)
        .lock_table(DashMap::<String, Arc<CollectionLock>>::new())
        .build()
        .unwrap();
    crud(&db);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn rwlock_table_crud() {
    let root = temp_root("lt_rwlock");
    let db = Driver::builder(&root)
        .lock_table(RwLock::new(HashMap::<String, Arc<CollectionLock>>::new()))
        .build()
        .unwrap();
    crud(&db);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn collection_lock_is_reused() {
    let root = temp_root("lt_reuse");
    let db = Driver::open(&root).unwrap();
    let a = db.collection_lock("users");
    let b = db.collection_lock("users");
    let other = db.collection_lock("orders");
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &other));

    // locks outlive the collection they guard
    db.write("users", "ann", &1).unwrap();
    db.delete("users", "").unwrap();
    assert!(Arc::ptr_eq(&a, &db.collection_lock("users")));
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn collection_lock_is_shared_across_threads() {
    let root = temp_root("lt_threads");
    let db = Arc::new(
        Driver::builder(&root)
            .lock_table(RwLock::new(HashMap::<String, Arc<CollectionLock>>::new()))
            .build()
            .unwrap(),
    );
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = Arc::clone(&db);
            std::thread::spawn(move || db.collection_lock("shared"))
        })
        .collect();
    let locks: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for lock in &locks[1..] {
        assert!(Arc::ptr_eq(&locks[0], lock));
    }
    let _ = std::fs::remove_dir_all(&root);
}

