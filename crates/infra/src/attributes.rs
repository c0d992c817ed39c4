//! Attribute registry backed by a document-store collection.

use tracing::{info, warn};

use storefront_catalog::{Attribute, AttributeSet, NewAttribute, Slug};
use storefront_core::{AttributeId, DomainError, Entity};

use crate::error::CatalogError;
use crate::store::codec::{decode, encode};
use crate::store::{CollectionPath, DocumentStore, FieldFilter, StoredDocument};

#[derive(Debug, Clone)]
pub struct AttributeRegistry<S> {
    store: S,
    collection: CollectionPath,
}

impl<S> AttributeRegistry<S>
where
    S: DocumentStore,
{
    pub fn new(store: S, collection: CollectionPath) -> Self {
        Self { store, collection }
    }

    /// Define an attribute. Names are unique within a category.
    #[tracing::instrument(skip(self, new), fields(name = %new.name, category = %new.category))]
    pub async fn create(&self, new: NewAttribute) -> Result<Attribute, CatalogError> {
        let attribute = new.into_attribute(AttributeId::new())?;
        let slug = Slug::from_name(&attribute.category);

        let same_name = self
            .store
            .query(
                &self.collection,
                Some(&FieldFilter::equals("name", attribute.name.as_str())),
            )
            .await?;
        if decode_all(same_name).iter().any(|a| a.applies_to(&slug)) {
            return Err(DomainError::conflict(format!(
                "attribute '{}' already exists for category '{slug}'",
                attribute.name
            ))
            .into());
        }

        self.store
            .set(&self.collection.doc(attribute.key()), encode(&attribute)?, false)
            .await?;
        info!(attribute_id = %attribute.id, "attribute created");
        Ok(attribute)
    }

    /// Attributes that apply to `category` (display name or slug), by name.
    pub async fn list_for_category(&self, category: &str) -> Result<Vec<Attribute>, CatalogError> {
        let slug = Slug::from_name(category);
        let mut attributes: Vec<Attribute> = self
            .list()
            .await?
            .into_iter()
            .filter(|a| a.applies_to(&slug))
            .collect();
        attributes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(attributes)
    }

    pub async fn set_for_category(&self, category: &str) -> Result<AttributeSet, CatalogError> {
        Ok(AttributeSet::new(self.list_for_category(category).await?))
    }

    pub async fn list(&self) -> Result<Vec<Attribute>, CatalogError> {
        let docs = self.store.query(&self.collection, None).await?;
        Ok(decode_all(docs))
    }

    #[tracing::instrument(skip(self), fields(attribute_id = %id))]
    pub async fn delete(&self, id: &AttributeId) -> Result<(), CatalogError> {
        let path = self.collection.doc(id);
        if self.store.get(&path).await?.is_none() {
            return Err(CatalogError::NotFound {
                kind: "attribute",
                id: id.to_string(),
            });
        }
        self.store.delete(&path).await?;
        Ok(())
    }
}

fn decode_all(docs: Vec<StoredDocument>) -> Vec<Attribute> {
    docs.into_iter()
        .filter_map(|doc| match decode::<Attribute>(&doc.id, doc.data) {
            Ok(a) => Some(a),
            Err(e) => {
                warn!(attribute_id = %doc.id, error = %e, "skipping malformed attribute");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use storefront_catalog::AttributeValue;

    use crate::store::InMemoryDocumentStore;

    fn registry() -> AttributeRegistry<Arc<InMemoryDocumentStore>> {
        AttributeRegistry::new(
            Arc::new(InMemoryDocumentStore::new()),
            CollectionPath::root("attributes").unwrap(),
        )
    }

    fn new_attribute(name: &str, category: &str, values: &[&str]) -> NewAttribute {
        NewAttribute {
            name: name.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn lists_by_category_slug() {
        let reg = registry();
        reg.create(new_attribute("size", "Wall Papers", &["S", "L"])).await.unwrap();
        reg.create(new_attribute("color", "wall-papers", &["red"])).await.unwrap();
        reg.create(new_attribute("finish", "Tiles", &["matte"])).await.unwrap();

        let names: Vec<_> = reg
            .list_for_category("Wall Papers")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["color".to_string(), "size".to_string()]);
        assert_eq!(reg.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn duplicate_name_in_same_category_conflicts() {
        let reg = registry();
        reg.create(new_attribute("size", "Tiles", &["S"])).await.unwrap();
        let err = reg.create(new_attribute("size", "tiles", &["M"])).await.unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::Conflict(_))));

        // Same name in another category is fine.
        reg.create(new_attribute("size", "Rugs", &["M"])).await.unwrap();
    }

    #[tokio::test]
    async fn set_for_category_validates_values() {
        let reg = registry();
        reg.create(new_attribute("size", "Tiles", &["S", "M"])).await.unwrap();
        let set = reg.set_for_category("tiles").await.unwrap();

        let bad = BTreeMap::from([("size".to_string(), AttributeValue::One("XXL".to_string()))]);
        assert!(set.validate(&bad).is_err());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let reg = registry();
        let created = reg.create(new_attribute("size", "Tiles", &["S"])).await.unwrap();
        reg.delete(&created.id).await.unwrap();
        assert!(reg.delete(&created.id).await.unwrap_err().is_not_found());
    }
}
