//! Draft authoring and the publish/unpublish transition.
//!
//! A transition is two independent writes: the record is written to its
//! destination, then the source is deleted. There is no transaction. If the
//! delete fails the record exists in both places, which the locator and the
//! aggregator resolve in favour of the live copy; a crash can duplicate a
//! record but never lose it.

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use storefront_catalog::{Namespace, NewProduct, Product, ProductLocation, ProductPatch, Slug};
use storefront_core::{DomainError, Entity, ProductId};

use crate::attributes::AttributeRegistry;
use crate::categories::CategoryDirectory;
use crate::error::{CatalogError, TransitionStep};
use crate::locator::ProductLocator;
use crate::store::codec::{decode, encode};
use crate::store::{CollectionPath, DocumentPath, DocumentStore, StoreError};

#[derive(Debug, Clone)]
pub struct PublishWorkflow<S, D> {
    store: S,
    locator: ProductLocator<S, D>,
    attributes: AttributeRegistry<S>,
    namespaces: Vec<Namespace>,
    drafts: CollectionPath,
}

impl<S, D> PublishWorkflow<S, D>
where
    S: DocumentStore,
    D: CategoryDirectory,
{
    pub fn new(
        store: S,
        locator: ProductLocator<S, D>,
        attributes: AttributeRegistry<S>,
        namespaces: Vec<Namespace>,
        drafts: CollectionPath,
    ) -> Self {
        Self {
            store,
            locator,
            attributes,
            namespaces,
            drafts,
        }
    }

    /// Move a draft to the live table named by its own `db` and `category`.
    ///
    /// Returns the path the record was written to.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn publish(&self, id: &ProductId) -> Result<DocumentPath, CatalogError> {
        let source = self.drafts.doc(id);
        let draft = self
            .read(&source)
            .await?
            .ok_or_else(|| CatalogError::product_not_found(id))?;
        let (db, category) = draft.intended_location()?;
        let destination = CollectionPath::live_products(&db, &category).doc(id);

        self.transfer(id, &source, &destination, encode(&draft.to_live())?)
            .await?;
        info!(product_id = %id, destination = %destination, "product published");
        Ok(destination)
    }

    /// Move a live record back to the drafts table.
    ///
    /// `category` may be a display name or a slug. The draft remembers `db` and
    /// the category slug so a later publish returns it to the same table.
    #[tracing::instrument(skip(self), fields(product_id = %id, db = %db))]
    pub async fn unpublish(
        &self,
        id: &ProductId,
        db: &Namespace,
        category: &str,
    ) -> Result<DocumentPath, CatalogError> {
        let slug = Slug::from_name(category);
        if slug.is_empty() {
            return Err(DomainError::validation("category cannot be empty").into());
        }
        let source = CollectionPath::live_products(db, &slug).doc(id);
        let live = self
            .read(&source)
            .await?
            .ok_or_else(|| CatalogError::product_not_found(id))?;
        let destination = self.drafts.doc(id);

        self.transfer(id, &source, &destination, encode(&live.to_draft(db, &slug))?)
            .await?;
        info!(product_id = %id, source = %source, "product unpublished");
        Ok(destination)
    }

    /// Create a draft with a fresh id and creation timestamp.
    #[tracing::instrument(skip(self, new), fields(db = %new.db, category = %new.category))]
    pub async fn create_draft(&self, new: NewProduct) -> Result<Product, CatalogError> {
        if !self.namespaces.contains(&new.db) {
            return Err(DomainError::validation(format!("unknown namespace '{}'", new.db)).into());
        }
        let product = new.into_draft(ProductId::new(), Utc::now())?;
        self.check_attributes(&product).await?;

        self.store
            .set(&self.drafts.doc(product.key()), encode(&product)?, false)
            .await?;
        info!(product_id = %product.id, "draft created");
        Ok(product)
    }

    /// Merge-write `patch` onto an existing draft and return the result.
    #[tracing::instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_draft(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, CatalogError> {
        let path = self.drafts.doc(id);
        let current = self
            .read(&path)
            .await?
            .ok_or_else(|| CatalogError::product_not_found(id))?;
        if patch.is_empty() {
            return Ok(current);
        }

        let next = patch.apply_to(&current)?;
        if let Some(db) = &patch.db {
            let db = Namespace::parse(db.as_str())?;
            if !self.namespaces.contains(&db) {
                return Err(DomainError::validation(format!("unknown namespace '{db}'")).into());
            }
        }
        if patch.attributes.is_some() || patch.category.is_some() {
            self.check_attributes(&next).await?;
        }

        self.store.set(&path, patched_fields(&patch, &next)?, true).await?;
        Ok(next)
    }

    /// Delete a product wherever its authoritative copy lives.
    ///
    /// A draft copy left behind by an interrupted publish is removed too.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<ProductLocation, CatalogError> {
        let found = self.locator.locate(id).await?;
        self.store.delete(&found.path(&self.drafts)).await?;
        if !found.location.is_draft() {
            let stray = self.drafts.doc(id);
            if let Err(e) = self.store.delete(&stray).await {
                warn!(product_id = %id, error = %e, "failed to remove draft copy");
            }
        }
        info!(product_id = %id, location = %found.location, "product deleted");
        Ok(found.location)
    }

    async fn read(&self, path: &DocumentPath) -> Result<Option<Product>, CatalogError> {
        match self.store.get(path).await? {
            Some(doc) => Ok(Some(decode(path.id(), doc)?)),
            None => Ok(None),
        }
    }

    async fn check_attributes(&self, product: &Product) -> Result<(), CatalogError> {
        let Some(category) = product.category.as_deref() else {
            return Ok(());
        };
        self.attributes
            .set_for_category(category)
            .await?
            .validate(&product.attributes)?;
        Ok(())
    }

    async fn transfer(
        &self,
        id: &ProductId,
        source: &DocumentPath,
        destination: &DocumentPath,
        document: JsonValue,
    ) -> Result<(), CatalogError> {
        self.store
            .set(destination, document, false)
            .await
            .map_err(failed_at(id, TransitionStep::WriteDestination))?;
        self.store
            .delete(source)
            .await
            .map_err(failed_at(id, TransitionStep::DeleteSource))?;
        Ok(())
    }
}

/// Fields of `next` named by `patch`, as normalized by the patch application.
fn patched_fields(patch: &ProductPatch, next: &Product) -> Result<JsonValue, StoreError> {
    let touched = encode(patch)?;
    let mut document = encode(next)?;
    if let (Some(fields), Some(touched)) = (document.as_object_mut(), touched.as_object()) {
        fields.retain(|key, _| touched.contains_key(key));
    }
    Ok(document)
}

fn failed_at(id: &ProductId, step: TransitionStep) -> impl FnOnce(StoreError) -> CatalogError + '_ {
    move |source| CatalogError::TransitionFailure {
        id: id.clone(),
        step,
        source,
    }
}
