//! Document store that keeps every record as its own JSON file.
//!
//! Records are grouped into collections, one directory each:
//! `<root>/<collection>/<key>.json`. Writes are atomic (temp file + rename),
//! and writes/deletes within a collection are serialized by a per-collection
//! lock from a pluggable lock table (DashMap, `RwLock<HashMap>`).
//!
//! ```rust,no_run
//! use json_docstore::Driver;
//! use serde_json::{json, Value};
//!
//! let db = Driver::open("data").unwrap();
//! db.write("users", "ann", &json!({"name": "Ann", "age": 31})).unwrap();
//! let ann: Value = db.read("users", "ann").unwrap();
//! assert_eq!(ann["age"], 31);
//! db.delete("users", "ann").unwrap();
//! ```
//!
//! **Last writer wins.** Locks only exist inside one process. Several
//! processes sharing a root still never see torn files, but their writes to
//! the same key race.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod driver;
pub mod error;
pub mod locks;
pub mod persist;
pub mod serializer;

pub use driver::{Driver, DriverBuilder};
pub use error::{Error, Result};
pub use locks::{CollectionLock, LockTable};

/// Default lock table: DashMap.
pub type DefaultLockTable = dashmap::DashMap<String, std::sync::Arc<CollectionLock>>;
