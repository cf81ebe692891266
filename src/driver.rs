//! The driver: collection/key to file mapping, atomic writes, and per-collection
//! locking.

use crate::error::{Error, Result};
use crate::locks::{CollectionLock, LockTable};
use crate::persist::{self, atomic_write, read_document, Removed, RECORD_EXT};
use crate::serializer::{JsonSerializer, Serializer, DEFAULT_INDENT};
use crate::DefaultLockTable;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Document store rooted at a directory.
///
/// Every record lives in `<root>/<collection>/<key>.json`. Writes go through a
/// temp file and a rename, so a reader never sees half a document. Writes and
/// deletes in the same collection are serialized by a per-collection lock;
/// reads take no lock at all.
///
/// The lock table backend `M` is pluggable (see [`LockTable`]). Use
/// [`open`](Driver::open) for the defaults or [`builder`](Driver::builder) to
/// change them.
pub struct Driver<M = DefaultLockTable> {
    root: PathBuf,
    locks: M,
    // serializes inserts into `locks`; never held across file I/O
    table_guard: Mutex<()>,
    serializer: JsonSerializer,
}

impl Driver {
    /// Open (or create) a store at `root` with tab-indented JSON and the
    /// default lock table.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::builder(root).build()
    }

    /// Start configuring a new driver. Call [`.build()`](DriverBuilder::build)
    /// when ready.
    pub fn builder(root: impl AsRef<Path>) -> DriverBuilder {
        DriverBuilder::new(root)
    }
}

impl<M: LockTable> Driver<M> {
    /// Normalized root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The lock guarding writes and deletes in `collection`, created on first
    /// use. The same lock is returned for the driver's whole lifetime.
    pub fn collection_lock(&self, collection: &str) -> Arc<CollectionLock> {
        if let Some(lock) = self.locks.get(collection) {
            return lock;
        }
        let _table = self.table_guard.lock();
        match self.locks.get(collection) {
            Some(lock) => lock,
            None => self.locks.insert(collection.to_owned()),
        }
    }

    // ---- writes ----

    /// Store `value` under `key` in `collection`, replacing any previous
    /// document.
    ///
    /// An empty `collection` or `key` means there is nothing to do: no file is
    /// touched and `Ok(())` is returned.
    pub fn write<T>(&self, collection: &str, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if collection.is_empty() || key.is_empty() {
            tracing::warn!(collection, key, "empty collection or key, nothing written");
            return Ok(());
        }
        check_name(collection)?;
        check_name(key)?;

        let lock = self.collection_lock(collection);
        let _guard = lock.lock();

        let dir = self.root.join(collection);
        std::fs::create_dir_all(&dir)?;
        let bytes = self.serializer.serialize(value)?;
        atomic_write(&dir.join(record_file(key)), &bytes)?;

        tracing::debug!(collection, key, bytes = bytes.len(), "record written");
        Ok(())
    }

    /// Remove one record, or the whole collection when `key` is empty.
    ///
    /// Removing something that isn't there succeeds. An empty `collection` is
    /// a no-op.
    pub fn delete(&self, collection: &str, key: &str) -> Result<()> {
        if collection.is_empty() {
            tracing::warn!(key, "empty collection, nothing deleted");
            return Ok(());
        }
        check_name(collection)?;
        if !key.is_empty() {
            check_name(key)?;
        }

        let lock = self.collection_lock(collection);
        let _guard = lock.lock();

        let dir = self.root.join(collection);
        let target = if key.is_empty() {
            dir
        } else {
            dir.join(record_file(key))
        };
        match persist::remove(&target)? {
            Removed::Dir => tracing::debug!(collection, "collection removed"),
            Removed::File => tracing::debug!(collection, key, "record removed"),
            Removed::Nothing => tracing::warn!(collection, key, "nothing to delete"),
        }
        Ok(())
    }

    // ---- reads ----

    /// Decode the document at `collection`/`key` into `out`.
    ///
    /// With an empty `collection` or `key` this does nothing and leaves `out`
    /// untouched. On error `out` is also left untouched.
    pub fn read_into<T>(&self, collection: &str, key: &str, out: &mut T) -> Result<()>
    where
        T: DeserializeOwned,
    {
        if collection.is_empty() || key.is_empty() {
            tracing::warn!(collection, key, "empty collection or key, nothing read");
            return Ok(());
        }
        *out = self.load(collection, key)?;
        Ok(())
    }

    /// Decode and return the document at `collection`/`key`.
    ///
    /// Empty names can't identify a record, so they report
    /// [`Error::NotFound`] without touching the disk.
    pub fn read<T>(&self, collection: &str, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if collection.is_empty() || key.is_empty() {
            return Err(Error::NotFound(format!("{collection}/{key}")));
        }
        self.load(collection, key)
    }

    /// Raw JSON text of every record in `collection`, sorted by key.
    ///
    /// Fails on the first file that can't be read; no partial result is
    /// returned. An empty `collection` yields an empty list.
    pub fn read_all(&self, collection: &str) -> Result<Vec<String>> {
        if collection.is_empty() {
            tracing::warn!("empty collection, nothing read");
            return Ok(Vec::new());
        }
        check_name(collection)?;

        let records = persist::list_records(&self.root.join(collection))?;
        let mut docs = Vec::with_capacity(records.len());
        for (_, path) in records {
            // a record deleted after listing surfaces as NotFound, same as `read`
            let bytes = read_document(&path)?;
            docs.push(String::from_utf8(bytes).map_err(|e| Error::Io(e.to_string()))?);
        }
        tracing::debug!(collection, count = docs.len(), "collection read");
        Ok(docs)
    }

    /// Like [`read_all`](Self::read_all) but decodes every document as `T`.
    pub fn read_all_as<T>(&self, collection: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.read_all(collection)?
            .into_iter()
            .map(|doc| self.serializer.deserialize(doc.as_bytes()))
            .collect()
    }

    /// Keys of every record in `collection`, sorted.
    pub fn keys(&self, collection: &str) -> Result<Vec<String>> {
        if collection.is_empty() {
            return Ok(Vec::new());
        }
        check_name(collection)?;
        let records = persist::list_records(&self.root.join(collection))?;
        Ok(records.into_iter().map(|(k, _)| k).collect())
    }

    /// `true` if a record file exists for `collection`/`key`.
    ///
    /// Unlike the other accessors this never fails: empty or path-like names
    /// (which [`read`](Self::read) would reject with [`Error::InvalidName`])
    /// simply report `false`.
    #[must_use]
    pub fn contains(&self, collection: &str, key: &str) -> bool {
        if check_name(collection).is_err() || check_name(key).is_err() {
            return false;
        }
        self.root.join(collection).join(record_file(key)).is_file()
    }

    /// Names of all collections under the root, sorted.
    pub fn collections(&self) -> Result<Vec<String>> {
        persist::list_dirs(&self.root)
    }

    // ---- internal ----

    fn load<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<T> {
        check_name(collection)?;
        check_name(key)?;
        let bytes = read_document(&self.root.join(collection).join(record_file(key)))?;
        self.serializer.deserialize(&bytes)
    }
}

impl<M: LockTable> std::fmt::Debug for Driver<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("root", &self.root)
            .field("serializer", &self.serializer)
            .field("locked_collections", &self.locks.table_len())
            .finish_non_exhaustive()
    }
}

fn record_file(key: &str) -> String {
    format!("{key}.{RECORD_EXT}")
}

/// A name must be a single, ordinary path component.
fn check_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(&['/', '\\', '\0'][..]);
    if bad {
        return Err(Error::InvalidName(name.to_owned()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`Driver`].
///
/// ```rust,no_run
/// use json_docstore::Driver;
///
/// let db = Driver::builder("data")
///     .indent("  ")
///     .build()
///     .unwrap();
/// db.write("users", "ann", &serde_json::json!({"age": 31})).unwrap();
/// ```
pub struct DriverBuilder<M = DefaultLockTable> {
    root: PathBuf,
    pretty: bool,
    indent: String,
    locks: M,
}

impl DriverBuilder {
    fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            pretty: true,
            indent: DEFAULT_INDENT.to_owned(),
            locks: DefaultLockTable::default(),
        }
    }
}

impl<M: LockTable> DriverBuilder<M> {
    /// Write indented JSON (default) or compact single-line JSON.
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Indent used for pretty output (default: one tab). Only spaces and tabs
    /// are accepted.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Swap in a different lock table backend.
    pub fn lock_table<N: LockTable>(self, locks: N) -> DriverBuilder<N> {
        DriverBuilder {
            root: self.root,
            pretty: self.pretty,
            indent: self.indent,
            locks,
        }
    }

    /// Create the root directory if needed and return the driver.
    pub fn build(self) -> Result<Driver<M>> {
        if !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(Error::Config(format!(
                "indent must be spaces or tabs, got {:?}",
                self.indent
            )));
        }
        let serializer = if self.pretty {
            JsonSerializer::pretty(self.indent)
        } else {
            JsonSerializer::compact()
        };

        let root = persist::normalize(&self.root);
        std::fs::create_dir_all(&root)?;
        tracing::info!(root = %root.display(), "store opened");

        Ok(Driver {
            root,
            locks: self.locks,
            table_guard: Mutex::new(()),
            serializer,
        })
    }
}

impl<M> std::fmt::Debug for DriverBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverBuilder")
            .field("root", &self.root)
            .field("pretty", &self.pretty)
            .field("indent", &self.indent)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_be_single_components() {
        for ok in ["users", "bob", "a.b", "with space", "..hidden"] {
            assert!(check_name(ok).is_ok(), "{ok}");
        }
        for bad in ["", ".", "..", "a/b", "a\\b", "nul\0"] {
            assert_eq!(check_name(bad), Err(Error::InvalidName(bad.to_owned())));
        }
    }

    #[test]
    fn record_file_appends_extension() {
        assert_eq!(record_file("bob"), "bob.json");
    }
}
