use storefront_catalog::{Namespace, Slug};

use super::StoreError;

/// Path of a collection, e.g. `drafts` or `retailers/wallpapers/products`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Top-level collection. The name must be a single non-empty segment.
    pub fn root(name: &str) -> Result<Self, StoreError> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(StoreError::InvalidPath(format!(
                "'{name}' is not a single collection segment"
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Built-in collection names that are known to be single segments.
    pub(crate) fn trusted(name: &'static str) -> Self {
        Self(name.to_string())
    }

    /// Live products table for one namespace and category.
    pub fn live_products(db: &Namespace, category: &Slug) -> Self {
        Self(format!("{db}/{category}/products"))
    }

    pub fn doc(&self, id: impl AsRef<str>) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.as_ref().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path of a single document: a collection plus a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl core::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_live_and_draft_paths() {
        let drafts = CollectionPath::root("drafts").unwrap();
        assert_eq!(drafts.doc("p1").to_string(), "drafts/p1");

        let live = CollectionPath::live_products(
            &Namespace::parse("retailers").unwrap(),
            &Slug::from_name("Wall Papers"),
        );
        let path = live.doc("p1");
        assert_eq!(path.to_string(), "retailers/wall-papers/products/p1");
        assert_eq!(path.collection(), &live);
        assert_eq!(path.id(), "p1");
    }

    #[test]
    fn category_with_slash_stays_one_segment() {
        let live = CollectionPath::live_products(
            &Namespace::parse("retailers").unwrap(),
            &Slug::from_name("Home/Garden"),
        );
        assert_eq!(live.as_str(), "retailers/home-garden/products");
        assert_eq!(live.as_str().split('/').count(), 3);
    }

    #[test]
    fn root_rejects_nested_or_blank_names() {
        assert!(CollectionPath::root("a/b").is_err());
        assert!(CollectionPath::root(" ").is_err());
    }
}
