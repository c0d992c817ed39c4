use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::path::{CollectionPath, DocumentPath};

/// A document returned by a collection query, with its key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: JsonValue,
}

/// Equality predicate on a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: JsonValue,
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &JsonValue) -> bool {
        document.get(&self.field) == Some(&self.value)
    }
}

/// Document store operation error.
///
/// "Not found" is not an error: `get` returns `None` and querying a missing
/// collection yields an empty list.
///
/// ## Error Categories
///
/// - **Unavailable**: the backend cannot be reached (transport failure)
/// - **PermissionDenied**: backend-side access rules rejected the call
/// - **Backend**: any other failure reported by the backend
/// - **Serialization**: a document could not be encoded or decoded
/// - **InvalidPath**: a path could not address a document or collection
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    /// Whether the failure means the backend itself is unreachable, as opposed
    /// to one path being unreadable.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Path-addressed, asynchronous document store.
///
/// Implementations are shared handles owned by the caller (process- or
/// request-scoped); the catalog components hold them by value and never reach
/// for global state.
///
/// ## Semantics
///
/// - `get` returns `Ok(None)` for a missing document
/// - `set` replaces the document, or deep-merges object fields when `merge` is set
/// - `delete` of a missing document succeeds
/// - `query` of a missing collection returns an empty list; only direct
///   children of the collection are returned, never nested subcollections
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocumentPath) -> Result<Option<JsonValue>, StoreError>;

    async fn set(
        &self,
        path: &DocumentPath,
        document: JsonValue,
        merge: bool,
    ) -> Result<(), StoreError>;

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError>;

    async fn query(
        &self,
        collection: &CollectionPath,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<StoredDocument>, StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get(&self, path: &DocumentPath) -> Result<Option<JsonValue>, StoreError> {
        (**self).get(path).await
    }

    async fn set(
        &self,
        path: &DocumentPath,
        document: JsonValue,
        merge: bool,
    ) -> Result<(), StoreError> {
        (**self).set(path, document, merge).await
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        (**self).delete(path).await
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).query(collection, filter).await
    }
}
