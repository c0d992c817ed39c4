//! Product Locator: finds the authoritative copy of a product by id.
//!
//! There is no id → location index, so every possible location is probed:
//! the drafts table, then each live table `{db}/{slug}/products` for every
//! configured namespace and known category. All reads are issued together
//! and every one is awaited.

use futures::future::join_all;
use tracing::{debug, warn};

use storefront_catalog::{Category, Namespace, Product, ProductLocation, ProductStatus};
use storefront_core::{Entity, ProductId};

use crate::categories::CategoryDirectory;
use crate::error::CatalogError;
use crate::store::codec::decode;
use crate::store::{CollectionPath, DocumentPath, DocumentStore, StoreError};

/// A product together with the location its authoritative copy was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedProduct {
    pub product: Product,
    pub location: ProductLocation,
}

impl LocatedProduct {
    /// Document path of the authoritative copy.
    pub fn path(&self, drafts: &CollectionPath) -> DocumentPath {
        match &self.location {
            ProductLocation::Draft => drafts.doc(self.product.key()),
            ProductLocation::Live { db, category } => {
                CollectionPath::live_products(db, category).doc(self.product.key())
            }
        }
    }
}

impl AsRef<Product> for LocatedProduct {
    fn as_ref(&self) -> &Product {
        &self.product
    }
}

struct Candidate {
    location: ProductLocation,
    path: DocumentPath,
}

#[derive(Debug, Clone)]
pub struct ProductLocator<S, D> {
    store: S,
    directory: D,
    namespaces: Vec<Namespace>,
    drafts: CollectionPath,
}

impl<S, D> ProductLocator<S, D>
where
    S: DocumentStore,
    D: CategoryDirectory,
{
    pub fn new(store: S, directory: D, namespaces: Vec<Namespace>, drafts: CollectionPath) -> Self {
        Self {
            store,
            directory,
            namespaces,
            drafts,
        }
    }

    /// Locate `id` across the drafts table and every live table.
    ///
    /// A published live copy takes precedence over a draft copy.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn locate(&self, id: &ProductId) -> Result<LocatedProduct, CatalogError> {
        let categories = self.directory.list().await?;
        self.locate_among(id, &categories).await
    }

    /// Locate `id` using an already-fetched category list.
    pub async fn locate_among(
        &self,
        id: &ProductId,
        categories: &[Category],
    ) -> Result<LocatedProduct, CatalogError> {
        let candidates = self.candidates(id, categories);
        let reads = join_all(candidates.iter().map(|c| self.store.get(&c.path))).await;

        let mut draft: Option<Product> = None;
        let mut live: Option<LocatedProduct> = None;
        let mut transport: Option<StoreError> = None;

        for (candidate, read) in candidates.into_iter().zip(reads) {
            let doc = match read {
                Ok(Some(doc)) => doc,
                Ok(None) => continue,
                Err(e) => {
                    debug!(path = %candidate.path, error = %e, "candidate read failed");
                    if e.is_transport() && transport.is_none() {
                        transport = Some(e);
                    }
                    continue;
                }
            };
            let mut product = match decode::<Product>(id.as_str(), doc) {
                Ok(p) => p,
                Err(e) => {
                    debug!(path = %candidate.path, error = %e, "candidate not decodable");
                    continue;
                }
            };

            match candidate.location {
                ProductLocation::Draft => {
                    product.status = ProductStatus::Draft;
                    draft = Some(product);
                }
                location @ ProductLocation::Live { .. } => {
                    if live.is_none() && product.is_published() {
                        live = Some(LocatedProduct { product, location });
                    }
                }
            }
        }

        match (live, draft) {
            (Some(found), draft) => {
                if draft.is_some() {
                    warn!(
                        product_id = %id,
                        location = %found.location,
                        "product has both a live and a draft copy; using the live copy"
                    );
                }
                Ok(found)
            }
            (None, Some(product)) => Ok(LocatedProduct {
                product,
                location: ProductLocation::Draft,
            }),
            (None, None) => match transport {
                Some(e) => Err(CatalogError::Transport(e)),
                None => Err(CatalogError::product_not_found(id)),
            },
        }
    }

    fn candidates(&self, id: &ProductId, categories: &[Category]) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(1 + self.namespaces.len() * categories.len());
        candidates.push(Candidate {
            location: ProductLocation::Draft,
            path: self.drafts.doc(id),
        });
        for db in &self.namespaces {
            for category in categories {
                let slug = category.slug();
                if slug.is_empty() {
                    continue;
                }
                candidates.push(Candidate {
                    path: CollectionPath::live_products(db, &slug).doc(id),
                    location: ProductLocation::live(db.clone(), slug),
                });
            }
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use storefront_catalog::{NewCategory, Slug};
    use storefront_core::CategoryId;

    use crate::categories::StaticCategoryDirectory;
    use crate::store::{FaultOp, InMemoryDocumentStore};

    type TestLocator = ProductLocator<Arc<InMemoryDocumentStore>, StaticCategoryDirectory>;

    fn category(name: &str) -> Category {
        NewCategory::named(name).into_category(CategoryId::new()).unwrap()
    }

    fn locator(store: &Arc<InMemoryDocumentStore>, categories: &[&str]) -> TestLocator {
        ProductLocator::new(
            store.clone(),
            StaticCategoryDirectory::new(categories.iter().map(|c| category(c)).collect()),
            vec![
                Namespace::parse("retailers").unwrap(),
                Namespace::parse("buyers").unwrap(),
            ],
            CollectionPath::root("drafts").unwrap(),
        )
    }

    fn doc(title: &str, status: &str) -> serde_json::Value {
        json!({"title": title, "code": "C-1", "price": 10.0, "status": status})
    }

    fn live_path(db: &str, category: &str, id: &str) -> DocumentPath {
        CollectionPath::live_products(&Namespace::parse(db).unwrap(), &Slug::from_name(category))
            .doc(id)
    }

    #[tokio::test]
    async fn finds_published_live_copy() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .set(&live_path("buyers", "Tiles", "p1"), doc("Tile", "published"), false)
            .await
            .unwrap();

        let found = locator(&store, &["Wall Papers", "Tiles"])
            .locate(&ProductId::parse("p1").unwrap())
            .await
            .unwrap();
        assert_eq!(found.product.title, "Tile");
        assert_eq!(found.location.to_string(), "buyers/tiles");
        assert_eq!(
            found.path(&CollectionPath::root("drafts").unwrap()).to_string(),
            "buyers/tiles/products/p1"
        );
    }

    #[tokio::test]
    async fn live_copy_that_is_not_published_is_ignored() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .set(&live_path("retailers", "Tiles", "p1"), doc("Tile", "draft"), false)
            .await
            .unwrap();

        let err = locator(&store, &["Tiles"])
            .locate(&ProductId::parse("p1").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn draft_copy_reports_draft_status() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let drafts = CollectionPath::root("drafts").unwrap();
        store.set(&drafts.doc("p1"), doc("Draft", "published"), false).await.unwrap();

        let found = locator(&store, &["Tiles"])
            .locate(&ProductId::parse("p1").unwrap())
            .await
            .unwrap();
        assert_eq!(found.location, ProductLocation::Draft);
        assert_eq!(found.product.status, ProductStatus::Draft);
    }

    #[tokio::test]
    async fn unreadable_candidates_are_skipped() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.fail_under("retailers/", FaultOp::Read);
        store
            .set(&live_path("buyers", "Tiles", "p1"), doc("Tile", "published"), false)
            .await
            .unwrap();
        store
            .set(&live_path("buyers", "Rugs", "p2"), json!("not an object"), false)
            .await
            .unwrap();

        let loc = locator(&store, &["Tiles", "Rugs"]);
        assert!(loc.locate(&ProductId::parse("p1").unwrap()).await.is_ok());
        assert!(loc.locate(&ProductId::parse("p2").unwrap()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_as_transport() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let loc = locator(&store, &[]);
        store.set_unavailable(true);

        let err = loc
            .locate_among(&ProductId::parse("p1").unwrap(), &[category("Tiles")])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }
}
