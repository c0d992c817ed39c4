//! Document store boundary.
//!
//! The catalog never talks to a backend directly: every read and write goes
//! through [`DocumentStore`], injected by the caller. Documents are plain JSON
//! objects addressed by slash-separated paths; a record's id is its key, not a
//! field inside the document.

pub mod codec;
pub mod in_memory;
pub mod path;
pub mod r#trait;

pub use in_memory::{FaultOp, InMemoryDocumentStore};
pub use path::{CollectionPath, DocumentPath};
pub use r#trait::{DocumentStore, FieldFilter, StoreError, StoredDocument};
