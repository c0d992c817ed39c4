//! Entity trait: identity that survives moves between storage locations.

/// Entity marker + minimal interface.
///
/// Catalog records keep their identity when they move between collections: a
/// product id is the same document key in the drafts table and in a live table.
pub trait Entity {
    /// Strongly-typed identifier, usable as a document key.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + AsRef<str>;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Document key this entity is stored under.
    fn key(&self) -> &str {
        self.id().as_ref()
    }
}
