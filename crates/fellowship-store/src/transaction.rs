//! Transactions and write batches.

use crate::error::{Error, Result};
use crate::path::validate_document_path;
use crate::store::DocumentStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Buffered view over the store used inside [`DocumentStore::run_transaction`].
///
/// Reads see the transaction's own pending writes first, then committed
/// state. Nothing reaches RocksDB until the closure returns `Ok`.
pub struct Transaction<'a> {
    store: &'a DocumentStore,
    writes: BTreeMap<String, Option<Value>>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            writes: BTreeMap::new(),
        }
    }

    pub(crate) fn into_writes(self) -> BTreeMap<String, Option<Value>> {
        self.writes
    }

    /// Read a document.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.get_value(path)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// List a collection's committed documents, ordered by id.
    ///
    /// Pending writes of this transaction are not reflected.
    pub fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.store.list(collection)
    }

    /// Write a whole document.
    pub fn set<T: Serialize>(&mut self, path: &str, doc: &T) -> Result<()> {
        validate_document_path(path)?;
        self.writes
            .insert(path.to_string(), Some(serde_json::to_value(doc)?));
        Ok(())
    }

    /// Merge `fields` (a JSON object) into an existing document.
    pub fn update(&mut self, path: &str, fields: Value) -> Result<()> {
        let Value::Object(fields) = fields else {
            return Err(Error::NotAnObject(format!("update payload for {}", path)));
        };
        let mut current = self
            .get_value(path)?
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        let Value::Object(doc) = &mut current else {
            return Err(Error::NotAnObject(path.to_string()));
        };
        for (field, value) in fields {
            doc.insert(field, value);
        }
        self.writes.insert(path.to_string(), Some(current));
        Ok(())
    }

    /// Delete a document.
    pub fn delete(&mut self, path: &str) -> Result<()> {
        validate_document_path(path)?;
        self.writes.insert(path.to_string(), None);
        Ok(())
    }

    /// Delete a document and everything stored beneath it.
    pub fn delete_tree(&mut self, path: &str) -> Result<()> {
        validate_document_path(path)?;
        for key in self.store.descendant_keys(path)? {
            self.writes.insert(key, None);
        }
        let pending: Vec<String> = self
            .writes
            .keys()
            .filter(|key| key.starts_with(path) && key[path.len()..].starts_with('/'))
            .cloned()
            .collect();
        for key in pending {
            self.writes.insert(key, None);
        }
        self.writes.insert(path.to_string(), None);
        Ok(())
    }

    fn get_value(&self, path: &str) -> Result<Option<Value>> {
        match self.writes.get(path) {
            Some(pending) => {
                validate_document_path(path)?;
                Ok(pending.clone())
            }
            None => self.store.get_value(path),
        }
    }
}

#[derive(Debug, Clone)]
enum BatchWrite {
    Set { path: String, doc: Value },
    Update { path: String, fields: Value },
    Delete { path: String },
    DeleteTree { path: String },
}

/// Writes collected up front and committed atomically with
/// [`DocumentStore::commit`].
#[derive(Debug, Clone, Default)]
pub struct Batch {
    writes: Vec<BatchWrite>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a whole-document write.
    pub fn set<T: Serialize>(&mut self, path: &str, doc: &T) -> Result<()> {
        self.writes.push(BatchWrite::Set {
            path: path.to_string(),
            doc: serde_json::to_value(doc)?,
        });
        Ok(())
    }

    /// Queue a field merge. The document must exist at commit time.
    pub fn update(&mut self, path: &str, fields: Value) {
        self.writes.push(BatchWrite::Update {
            path: path.to_string(),
            fields,
        });
    }

    /// Queue a delete.
    pub fn delete(&mut self, path: &str) {
        self.writes.push(BatchWrite::Delete {
            path: path.to_string(),
        });
    }

    /// Queue a recursive delete of a document and its sub-collections.
    pub fn delete_tree(&mut self, path: &str) {
        self.writes.push(BatchWrite::DeleteTree {
            path: path.to_string(),
        });
    }

    /// Number of queued writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub(crate) fn apply_to(self, txn: &mut Transaction<'_>) -> Result<()> {
        for write in self.writes {
            match write {
                BatchWrite::Set { path, doc } => txn.set(&path, &doc)?,
                BatchWrite::Update { path, fields } => txn.update(&path, fields)?,
                BatchWrite::Delete { path } => txn.delete(&path)?,
                BatchWrite::DeleteTree { path } => txn.delete_tree(&path)?,
            }
        }
        Ok(())
    }
}
