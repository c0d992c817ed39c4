//! Catalog service wiring every component over one store handle.

use storefront_catalog::{Namespace, NewProduct, Product, ProductFilter, ProductLocation, ProductPatch};
use storefront_core::ProductId;

use crate::aggregator::{CatalogAggregator, CatalogEntry, CatalogQuery};
use crate::attributes::AttributeRegistry;
use crate::categories::{CategoryDirectory, StoreCategoryDirectory};
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::locator::{LocatedProduct, ProductLocator};
use crate::store::{DocumentPath, DocumentStore};
use crate::transition::PublishWorkflow;

/// Catalog operations over a caller-owned document store.
///
/// `S` and `D` are cheap shared handles (typically `Arc<_>`); each component
/// keeps its own clone.
#[derive(Debug, Clone)]
pub struct Catalog<S, D> {
    config: CatalogConfig,
    locator: ProductLocator<S, D>,
    workflow: PublishWorkflow<S, D>,
    aggregator: CatalogAggregator<S, D>,
    categories: StoreCategoryDirectory<S>,
    attributes: AttributeRegistry<S>,
}

impl<S> Catalog<S, StoreCategoryDirectory<S>>
where
    S: DocumentStore + Clone,
{
    /// Catalog whose categories live in the configured categories collection.
    pub fn with_store(store: S, config: CatalogConfig) -> Self {
        let directory = StoreCategoryDirectory::new(store.clone(), config.categories_collection.clone());
        Self::new(store, directory, config)
    }
}

impl<S, D> Catalog<S, D>
where
    S: DocumentStore + Clone,
    D: CategoryDirectory + Clone,
{
    pub fn new(store: S, directory: D, config: CatalogConfig) -> Self {
        let locator = ProductLocator::new(
            store.clone(),
            directory.clone(),
            config.namespaces.clone(),
            config.drafts_collection.clone(),
        );
        let attributes = AttributeRegistry::new(store.clone(), config.attributes_collection.clone());
        let workflow = PublishWorkflow::new(
            store.clone(),
            locator.clone(),
            attributes.clone(),
            config.namespaces.clone(),
            config.drafts_collection.clone(),
        );
        let aggregator = CatalogAggregator::new(
            store.clone(),
            directory,
            config.namespaces.clone(),
            config.drafts_collection.clone(),
        );
        let categories = StoreCategoryDirectory::new(store, config.categories_collection.clone());

        Self {
            config,
            locator,
            workflow,
            aggregator,
            categories,
            attributes,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Category management over the configured categories collection.
    pub fn categories(&self) -> &StoreCategoryDirectory<S> {
        &self.categories
    }

    pub fn attributes(&self) -> &AttributeRegistry<S> {
        &self.attributes
    }

    pub async fn locate(&self, id: &ProductId) -> Result<LocatedProduct, CatalogError> {
        self.locator.locate(id).await
    }

    /// Parse a raw id and locate it. Blank ids fail before any read.
    pub async fn locate_str(&self, id: &str) -> Result<LocatedProduct, CatalogError> {
        let id = ProductId::parse(id)?;
        self.locate(&id).await
    }

    pub async fn list(&self, query: &CatalogQuery) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.aggregator.list(query).await
    }

    pub async fn search(
        &self,
        query: &CatalogQuery,
        filter: &ProductFilter,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.aggregator.search(query, filter).await
    }

    pub async fn create_draft(&self, new: NewProduct) -> Result<Product, CatalogError> {
        self.workflow.create_draft(new).await
    }

    pub async fn update_draft(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, CatalogError> {
        self.workflow.update_draft(id, patch).await
    }

    pub async fn publish(&self, id: &ProductId) -> Result<DocumentPath, CatalogError> {
        self.workflow.publish(id).await
    }

    pub async fn unpublish(
        &self,
        id: &ProductId,
        db: &Namespace,
        category: &str,
    ) -> Result<DocumentPath, CatalogError> {
        self.workflow.unpublish(id, db, category).await
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<ProductLocation, CatalogError> {
        self.workflow.delete_product(id).await
    }
}
