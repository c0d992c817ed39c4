use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use super::path::{CollectionPath, DocumentPath};
use super::r#trait::{DocumentStore, FieldFilter, StoreError, StoredDocument};

/// Operation kind targeted by an injected fault.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FaultOp {
    Read,
    Write,
    Delete,
}

#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    /// Path prefix → failing operation.
    by_prefix: Vec<(String, FaultOp)>,
}

type Collections = HashMap<CollectionPath, BTreeMap<String, JsonValue>>;

/// In-memory document store.
///
/// Intended for tests/dev. Supports fault injection (per path prefix and
/// operation, or a whole-backend outage) and records every path read so tests
/// can assert which candidates were probed.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
    faults: RwLock<Faults>,
    reads: RwLock<Vec<String>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the backend were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut faults) = self.faults.write() {
            faults.unavailable = unavailable;
        }
    }

    /// Fail `op` on every path starting with `prefix` with a permission error.
    pub fn fail_under(&self, prefix: impl Into<String>, op: FaultOp) {
        if let Ok(mut faults) = self.faults.write() {
            faults.by_prefix.push((prefix.into(), op));
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut faults) = self.faults.write() {
            *faults = Faults::default();
        }
    }

    /// Paths read so far (documents and collections), in call order.
    pub fn reads(&self) -> Vec<String> {
        self.reads.read().map(|r| r.clone()).unwrap_or_default()
    }

    /// Whether a document exists, without recording a read.
    pub fn contains(&self, path: &DocumentPath) -> bool {
        self.collections
            .read()
            .map(|c| {
                c.get(path.collection())
                    .is_some_and(|docs| docs.contains_key(path.id()))
            })
            .unwrap_or(false)
    }

    fn check(&self, path: &str, op: FaultOp) -> Result<(), StoreError> {
        let faults = self
            .faults
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        if faults.unavailable {
            return Err(StoreError::Unavailable("in-memory backend offline".to_string()));
        }
        let hit = faults
            .by_prefix
            .iter()
            .any(|(prefix, fault)| *fault == op && path.starts_with(prefix.as_str()));
        if hit {
            return Err(StoreError::PermissionDenied(format!("{op:?} on {path}")));
        }
        Ok(())
    }

    fn record_read(&self, path: String) {
        if let Ok(mut reads) = self.reads.write() {
            reads.push(path);
        }
    }
}

/// Deep merge of object fields; anything else is replaced.
fn merge_into(target: &mut JsonValue, patch: JsonValue) {
    match (target, patch) {
        (JsonValue::Object(target), JsonValue::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<JsonValue>, StoreError> {
        let key = path.to_string();
        self.record_read(key.clone());
        self.check(&key, FaultOp::Read)?;

        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(collections
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .cloned())
    }

    async fn set(
        &self,
        path: &DocumentPath,
        document: JsonValue,
        merge: bool,
    ) -> Result<(), StoreError> {
        self.check(&path.to_string(), FaultOp::Write)?;

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let docs = collections.entry(path.collection().clone()).or_default();
        if merge {
            if let Some(existing) = docs.get_mut(path.id()) {
                merge_into(existing, document);
                return Ok(());
            }
        }
        docs.insert(path.id().to_string(), document);
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        self.check(&path.to_string(), FaultOp::Delete)?;

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        if let Some(docs) = collections.get_mut(path.collection()) {
            docs.remove(path.id());
            if docs.is_empty() {
                collections.remove(path.collection());
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let key = collection.to_string();
        self.record_read(key.clone());
        self.check(&key, FaultOp::Read)?;

        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };
        Ok(docs
            .iter()
            .filter(|(_, data)| filter.is_none_or(|f| f.matches(data)))
            .map(|(id, data)| StoredDocument {
                id: id.clone(),
                data: data.clone(),
            })
            .collect())
    }
}
