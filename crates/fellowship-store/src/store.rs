//! Persistent document storage using RocksDB.

use crate::error::{Error, Result};
use crate::path::{validate_collection_path, validate_document_path};
use crate::query::Query;
use crate::transaction::{Batch, Transaction};
use rocksdb::{Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Path-keyed JSON document store.
///
/// Reads go straight to RocksDB. Writes are serialized through a commit
/// lock; a transaction holds the lock for its whole closure.
pub struct DocumentStore {
    db: DB,
    commit_lock: Mutex<()>,
}

impl DocumentStore {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self {
            db,
            commit_lock: Mutex::new(()),
        })
    }

    // --- Documents ---

    /// Get a document by path.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.get_value(path)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Check whether a document exists.
    pub fn exists(&self, path: &str) -> Result<bool> {
        validate_document_path(path)?;
        Ok(self.db.get_pinned(path.as_bytes())?.is_some())
    }

    /// Store a document, replacing any previous version.
    pub fn set<T: Serialize>(&self, path: &str, doc: &T) -> Result<()> {
        self.run_transaction(|txn| txn.set(path, doc))
    }

    /// Merge the fields of `fields` into an existing document.
    pub fn update(&self, path: &str, fields: Value) -> Result<()> {
        self.run_transaction(|txn| txn.update(path, fields))
    }

    /// Delete a document. Deleting a missing document is not an error.
    pub fn delete(&self, path: &str) -> Result<()> {
        self.run_transaction(|txn| txn.delete(path))
    }

    // --- Collections ---

    /// List every document directly inside a collection, ordered by id.
    pub fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.query(collection, &Query::new())
    }

    /// Run a query over the direct children of a collection.
    pub fn query<T: DeserializeOwned>(&self, collection: &str, query: &Query) -> Result<Vec<T>> {
        let docs = self.collection_values(collection)?;
        query
            .execute(docs)
            .into_iter()
            .map(|(_, value)| Ok(serde_json::from_value(value)?))
            .collect()
    }

    // --- Atomic writes ---

    /// Run `f` as one atomic unit.
    ///
    /// Writes made through the [`Transaction`] are buffered and become
    /// visible together when `f` returns `Ok`. If `f` returns an error
    /// nothing is written and the error is passed through unchanged.
    pub fn run_transaction<R, E, F>(&self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        let _guard = self.lock();
        let mut txn = Transaction::new(self);
        let result = f(&mut txn)?;
        self.apply(txn.into_writes())?;
        Ok(result)
    }

    /// Commit a batch of writes atomically.
    pub fn commit(&self, batch: Batch) -> Result<()> {
        self.run_transaction(|txn| batch.apply_to(txn))
    }

    // --- Internals shared with transactions ---

    pub(crate) fn get_value(&self, path: &str) -> Result<Option<Value>> {
        validate_document_path(path)?;
        match self.db.get(path.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Every stored key strictly beneath `path`.
    pub(crate) fn descendant_keys(&self, path: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", path);
        let mut keys = Vec::new();

        let iter = self.db.prefix_iterator(prefix.as_bytes());
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }

        Ok(keys)
    }

    fn collection_values(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        validate_collection_path(collection)?;
        let prefix = format!("{}/", collection);
        let mut docs = Vec::new();

        let iter = self.db.prefix_iterator(prefix.as_bytes());
        for item in iter {
            let (key, value) = item?;
            let Some(rest) = key.strip_prefix(prefix.as_bytes()) else {
                break;
            };
            // Skip documents of nested sub-collections.
            if rest.contains(&b'/') {
                continue;
            }
            let id = String::from_utf8_lossy(rest).into_owned();
            docs.push((id, serde_json::from_slice(&value)?));
        }

        Ok(docs)
    }

    fn apply(&self, writes: BTreeMap<String, Option<Value>>) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }
        let mut batch = WriteBatch::default();
        for (path, doc) in &writes {
            match doc {
                Some(doc) => batch.put(path.as_bytes(), serde_json::to_vec(doc)?),
                None => batch.delete(path.as_bytes()),
            }
        }
        self.db.write(batch)?;
        tracing::trace!(writes = writes.len(), "committed write batch");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is unit, so a poisoned lock carries no bad state.
        self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Direction;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        rank: u32,
        #[serde(default)]
        done: bool,
    }

    fn note(id: &str, rank: u32) -> Note {
        Note {
            id: id.to_string(),
            rank,
            done: false,
        }
    }

    #[test]
    fn storage_roundtrip() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        store.set("notes/n1", &note("n1", 1)).unwrap();
        let loaded: Note = store.get("notes/n1").unwrap().unwrap();
        assert_eq!(loaded, note("n1", 1));
        assert!(store.exists("notes/n1").unwrap());
        assert!(store.get::<Note>("notes/n2").unwrap().is_none());
    }

    #[test]
    fn rejects_collection_path_for_document() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("notes", &note("x", 0)),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn update_merges_fields() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        store.set("notes/n1", &note("n1", 1)).unwrap();
        store.update("notes/n1", json!({"done": true})).unwrap();

        let loaded: Note = store.get("notes/n1").unwrap().unwrap();
        assert!(loaded.done);
        assert_eq!(loaded.rank, 1);
    }

    #[test]
    fn update_missing_document_fails() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.update("notes/missing", json!({"done": true})),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn list_skips_nested_collections() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        store.set("notes/a", &note("a", 1)).unwrap();
        store.set("notes/b", &note("b", 2)).unwrap();
        store.set("notes/a/comments/c1", &note("c1", 9)).unwrap();
        store.set("notesx/z", &note("z", 0)).unwrap();

        let notes: Vec<Note> = store.list("notes").unwrap();
        assert_eq!(notes, vec![note("a", 1), note("b", 2)]);

        let comments: Vec<Note> = store.list("notes/a/comments").unwrap();
        assert_eq!(comments.len(), 1);
    }

    #[test]
    fn query_orders_and_pages() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        for (id, rank) in [("a", 1), ("b", 4), ("c", 2), ("d", 3)] {
            store.set(&format!("notes/{}", id), &note(id, rank)).unwrap();
        }

        let first: Vec<Note> = store
            .query("notes", &Query::new().order_by("rank", Direction::Descending).limit(2))
            .unwrap();
        assert_eq!(first, vec![note("b", 4), note("d", 3)]);

        let second: Vec<Note> = store
            .query(
                "notes",
                &Query::new()
                    .order_by("rank", Direction::Descending)
                    .limit(2)
                    .start_after("d"),
            )
            .unwrap();
        assert_eq!(second, vec![note("c", 2), note("a", 1)]);
    }

    #[test]
    fn failed_transaction_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let result: Result<()> = store.run_transaction(|txn| {
            txn.set("notes/a", &note("a", 1))?;
            txn.update("notes/missing", json!({"done": true}))
        });

        assert!(result.is_err());
        assert!(!store.exists("notes/a").unwrap());
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        store.set("notes/counter", &note("counter", 0)).unwrap();

        const THREADS: u32 = 8;
        const ROUNDS: u32 = 25;
        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    for _ in 0..ROUNDS {
                        store
                            .run_transaction(|txn| -> Result<()> {
                                let current: Note = txn
                                    .get("notes/counter")?
                                    .ok_or(Error::NotFound("counter".into()))?;
                                std::thread::yield_now();
                                txn.update("notes/counter", json!({"rank": current.rank + 1}))
                            })
                            .unwrap();
                    }
                });
            }
        });

        let counter: Note = store.get("notes/counter").unwrap().unwrap();
        assert_eq!(counter.rank, THREADS * ROUNDS);
    }

    #[test]
    fn transaction_reads_its_own_writes() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let rank = store
            .run_transaction(|txn| -> Result<u32> {
                txn.set("notes/a", &note("a", 5))?;
                txn.update("notes/a", json!({"rank": 6}))?;
                let current: Note = txn.get("notes/a")?.ok_or(Error::NotFound("a".into()))?;
                Ok(current.rank)
            })
            .unwrap();

        assert_eq!(rank, 6);
        let stored: Note = store.get("notes/a").unwrap().unwrap();
        assert_eq!(stored.rank, 6);
    }

    #[test]
    fn batch_delete_tree_removes_descendants() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        store.set("notes/a", &note("a", 1)).unwrap();
        store.set("notes/a/comments/c1", &note("c1", 1)).unwrap();
        store.set("notes/ab", &note("ab", 1)).unwrap();

        let mut batch = Batch::new();
        batch.delete_tree("notes/a");
        store.commit(batch).unwrap();

        assert!(!store.exists("notes/a").unwrap());
        assert!(!store.exists("notes/a/comments/c1").unwrap());
        assert!(store.exists("notes/ab").unwrap());
    }
}
