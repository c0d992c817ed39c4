//! Category directory and category management.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use storefront_catalog::{Category, NewCategory};
use storefront_core::{CategoryId, DomainError, Entity};

use crate::error::CatalogError;
use crate::store::codec::{decode, encode};
use crate::store::{CollectionPath, DocumentStore, StoreError};

/// Source of the known categories, enumerated by the locator and aggregator.
#[async_trait::async_trait]
pub trait CategoryDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, StoreError>;
}

#[async_trait::async_trait]
impl<D> CategoryDirectory for Arc<D>
where
    D: CategoryDirectory + ?Sized,
{
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        (**self).list().await
    }
}

/// Fixed category list (tests, benches, static storefronts).
#[derive(Debug, Clone, Default)]
pub struct StaticCategoryDirectory {
    categories: Vec<Category>,
}

impl StaticCategoryDirectory {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }
}

#[async_trait::async_trait]
impl CategoryDirectory for StaticCategoryDirectory {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.clone())
    }
}

/// Categories kept in a document-store collection.
///
/// Slugs are recomputed from the stored name on every use. Renaming a category
/// therefore detaches its existing live product tables, which stay under the
/// old slug until their records are moved.
#[derive(Debug, Clone)]
pub struct StoreCategoryDirectory<S> {
    store: S,
    collection: CollectionPath,
}

impl<S> StoreCategoryDirectory<S>
where
    S: DocumentStore,
{
    pub fn new(store: S, collection: CollectionPath) -> Self {
        Self { store, collection }
    }

    pub async fn get(&self, id: &CategoryId) -> Result<Category, CatalogError> {
        let path = self.collection.doc(id);
        match self.store.get(&path).await? {
            Some(doc) => Ok(decode(id.as_str(), doc)?),
            None => Err(CatalogError::NotFound {
                kind: "category",
                id: id.to_string(),
            }),
        }
    }

    /// Create a category. Its slug must not collide with an existing one.
    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: NewCategory) -> Result<Category, CatalogError> {
        let category = new.into_category(CategoryId::new())?;
        let slug = category.slug();
        let existing = self.list().await?;
        if let Some(other) = existing.iter().find(|c| c.slug() == slug) {
            return Err(DomainError::conflict(format!(
                "category '{}' already uses slug '{slug}'",
                other.name
            ))
            .into());
        }

        self.store
            .set(&self.collection.doc(category.key()), encode(&category)?, false)
            .await?;
        info!(category_id = %category.id, %slug, "category created");
        Ok(category)
    }

    #[tracing::instrument(skip(self), fields(category_id = %id))]
    pub async fn rename(&self, id: &CategoryId, name: &str) -> Result<Category, CatalogError> {
        let mut category = self.get(id).await?;
        let previous = category.rename(name)?;
        let slug = category.slug();
        if slug != previous {
            let taken = self
                .list()
                .await?
                .into_iter()
                .any(|c| c.id != category.id && c.slug() == slug);
            if taken {
                return Err(DomainError::conflict(format!("slug '{slug}' is already in use")).into());
            }
        }

        self.store
            .set(&self.collection.doc(id), json!({ "name": category.name }), true)
            .await?;
        if slug != previous {
            warn!(
                category_id = %id,
                old_slug = %previous,
                new_slug = %slug,
                "category renamed; live products under the old slug are no longer listed"
            );
        }
        Ok(category)
    }

    #[tracing::instrument(skip(self), fields(category_id = %id))]
    pub async fn delete(&self, id: &CategoryId) -> Result<(), CatalogError> {
        let category = self.get(id).await?;
        self.store.delete(&self.collection.doc(id)).await?;
        info!(category_id = %id, slug = %category.slug(), "category deleted");
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S> CategoryDirectory for StoreCategoryDirectory<S>
where
    S: DocumentStore,
{
    /// Categories ordered by display name. Undecodable documents are skipped.
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let docs = self.store.query(&self.collection, None).await?;
        let mut categories: Vec<Category> = docs
            .into_iter()
            .filter_map(|doc| match decode::<Category>(&doc.id, doc.data) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(category_id = %doc.id, error = %e, "skipping malformed category");
                    None
                }
            })
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(categories)
    }
}
