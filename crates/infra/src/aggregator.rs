//! Catalog Aggregator: merged, newest-first view over drafts and live tables.

use std::collections::BTreeMap;

use chrono::Utc;
use futures::future::join_all;
use tracing::debug;

use storefront_catalog::{
    Namespace, Product, ProductFilter, ProductLocation, ProductStatus, Slug, sort_newest_first,
};

use crate::categories::CategoryDirectory;
use crate::error::CatalogError;
use crate::store::codec::decode;
use crate::store::{CollectionPath, DocumentStore, StoredDocument};

/// Which slice of the catalog to list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub namespace: Option<Namespace>,
    /// Category display name or slug.
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl CatalogQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One row of the merged catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub product: Product,
    pub location: ProductLocation,
}

impl AsRef<Product> for CatalogEntry {
    fn as_ref(&self) -> &Product {
        &self.product
    }
}

#[derive(Debug, Clone)]
pub struct CatalogAggregator<S, D> {
    store: S,
    directory: D,
    namespaces: Vec<Namespace>,
    drafts: CollectionPath,
}

impl<S, D> CatalogAggregator<S, D>
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

    /// Drafts and live records merged by id, newest first.
    ///
    /// A live record replaces a draft with the same id. Unreadable live tables
    /// contribute nothing; an unreadable drafts table fails the listing.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, query: &CatalogQuery) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.collect(query, None).await
    }

    /// Same as [`list`](Self::list), keeping only entries that match `filter`.
    /// The limit applies after filtering.
    #[tracing::instrument(skip(self, filter))]
    pub async fn search(
        &self,
        query: &CatalogQuery,
        filter: &ProductFilter,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.collect(query, Some(filter)).await
    }

    async fn collect(
        &self,
        query: &CatalogQuery,
        filter: Option<&ProductFilter>,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let slugs = self.category_slugs(query).await?;
        let requested_slug = query.category.as_deref().map(Slug::from_name);
        let namespaces: Vec<&Namespace> = match &query.namespace {
            Some(ns) => vec![ns],
            None => self.namespaces.iter().collect(),
        };

        let drafts = self.store.query(&self.drafts, None).await?;
        let tables: Vec<(Namespace, Slug)> = namespaces
            .iter()
            .flat_map(|db| slugs.iter().map(move |slug| ((*db).clone(), slug.clone())))
            .collect();
        let reads = join_all(tables.iter().map(|(db, slug)| {
            let collection = CollectionPath::live_products(db, slug);
            async move {
                let result = self.store.query(&collection, None).await;
                (collection, result)
            }
        }))
        .await;

        let mut merged: BTreeMap<String, CatalogEntry> = BTreeMap::new();
        for doc in drafts {
            let Some(mut product) = decode_product(&self.drafts, doc) else {
                continue;
            };
            if !draft_matches(&product, query.namespace.as_ref(), requested_slug.as_ref()) {
                continue;
            }
            product.status = ProductStatus::Draft;
            merged.insert(
                product.id.to_string(),
                CatalogEntry {
                    product,
                    location: ProductLocation::Draft,
                },
            );
        }

        for ((db, slug), (collection, result)) in tables.into_iter().zip(reads) {
            let docs = match result {
                Ok(docs) => docs,
                Err(e) => {
                    debug!(collection = %collection, error = %e, "live table read failed");
                    continue;
                }
            };
            for doc in docs {
                let Some(product) = decode_product(&collection, doc) else {
                    continue;
                };
                merged.insert(
                    product.id.to_string(),
                    CatalogEntry {
                        product,
                        location: ProductLocation::live(db.clone(), slug.clone()),
                    },
                );
            }
        }

        let mut entries: Vec<CatalogEntry> = merged.into_values().collect();
        sort_newest_first(&mut entries, Utc::now());
        if let Some(filter) = filter {
            entries = filter.apply(entries);
        }
        if let Some(limit) = query.limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn category_slugs(&self, query: &CatalogQuery) -> Result<Vec<Slug>, CatalogError> {
        if let Some(category) = &query.category {
            let slug = Slug::from_name(category);
            return Ok(if slug.is_empty() { vec![] } else { vec![slug] });
        }
        let mut slugs: Vec<Slug> = Vec::new();
        for category in self.directory.list().await? {
            let slug = category.slug();
            if !slug.is_empty() && !slugs.contains(&slug) {
                slugs.push(slug);
            }
        }
        Ok(slugs)
    }
}

/// Whether a draft belongs to the requested namespace and category.
///
/// Unscoped queries keep every draft, including drafts whose category is no
/// longer in the directory or that carry no location fields at all.
fn draft_matches(product: &Product, namespace: Option<&Namespace>, category: Option<&Slug>) -> bool {
    if let Some(ns) = namespace {
        if product.db.as_deref() != Some(ns.as_str()) {
            return false;
        }
    }
    match category {
        Some(requested) => {
            !requested.is_empty()
                && product
                    .category
                    .as_deref()
                    .is_some_and(|c| Slug::from_name(c) == *requested)
        }
        None => true,
    }
}

fn decode_product(collection: &CollectionPath, doc: StoredDocument) -> Option<Product> {
    match decode::<Product>(&doc.id, doc.data) {
        Ok(product) => Some(product),
        Err(e) => {
            debug!(collection = %collection, product_id = %doc.id, error = %e, "skipping undecodable product");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use storefront_catalog::{NewCategory, StockStatus};
    use storefront_core::CategoryId;

    use crate::categories::StaticCategoryDirectory;
    use crate::store::{FaultOp, InMemoryDocumentStore};

    fn aggregator(
        store: &Arc<InMemoryDocumentStore>,
    ) -> CatalogAggregator<Arc<InMemoryDocumentStore>, StaticCategoryDirectory> {
        let categories = ["Wall Papers", "Tiles"]
            .iter()
            .map(|name| NewCategory::named(*name).into_category(CategoryId::new()).unwrap())
            .collect();
        CatalogAggregator::new(
            store.clone(),
            StaticCategoryDirectory::new(categories),
            vec![
                Namespace::parse("retailers").unwrap(),
                Namespace::parse("buyers").unwrap(),
            ],
            CollectionPath::root("drafts").unwrap(),
        )
    }

    async fn put_live(store: &InMemoryDocumentStore, db: &str, slug: &str, id: &str, at: &str) {
        let path = CollectionPath::live_products(&Namespace::parse(db).unwrap(), &Slug::from_name(slug))
            .doc(id);
        let doc = json!({"title": id, "code": "C", "price": 5.0, "status": "published", "createdAt": at});
        store.set(&path, doc, false).await.unwrap();
    }

    async fn put_draft(store: &InMemoryDocumentStore, id: &str, db: &str, category: &str, at: &str) {
        let doc = json!({
            "title": id, "code": "C", "price": 5.0, "createdAt": at,
            "db": db, "category": category, "stockStatus": "Out of Stock"
        });
        store
            .set(&CollectionPath::root("drafts").unwrap().doc(id), doc, false)
            .await
            .unwrap();
    }

    fn ids(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.product.id.as_str()).collect()
    }

    #[tokio::test]
    async fn drafts_are_filtered_by_namespace_and_category() {
        let store = Arc::new(InMemoryDocumentStore::new());
        put_draft(&store, "d1", "retailers", "Wall Papers", "2024-01-01T00:00:00Z").await;
        put_draft(&store, "d2", "buyers", "Tiles", "2024-01-02T00:00:00Z").await;
        put_draft(&store, "d3", "retailers", "Rugs", "2024-01-03T00:00:00Z").await;
        let agg = aggregator(&store);

        // Rugs is not in the directory; unscoped listings still show it.
        let all = agg.list(&CatalogQuery::all()).await.unwrap();
        assert_eq!(ids(&all), vec!["d3", "d2", "d1"]);

        let retail = agg
            .list(&CatalogQuery::all().namespace(Namespace::parse("retailers").unwrap()))
            .await
            .unwrap();
        assert_eq!(ids(&retail), vec!["d3", "d1"]);

        let tiles = agg.list(&CatalogQuery::all().category("Tiles")).await.unwrap();
        assert_eq!(ids(&tiles), vec!["d2"]);

        let rugs = agg.list(&CatalogQuery::all().category("rugs")).await.unwrap();
        assert_eq!(ids(&rugs), vec!["d3"]);
    }

    #[tokio::test]
    async fn unscoped_listing_keeps_every_draft() {
        let store = Arc::new(InMemoryDocumentStore::new());
        put_draft(&store, "known", "retailers", "Tiles", "2024-01-03T00:00:00Z").await;
        put_draft(&store, "renamed", "retailers", "Old Name", "2024-01-02T00:00:00Z").await;
        store
            .set(
                &CollectionPath::root("drafts").unwrap().doc("bare"),
                json!({"title": "bare", "code": "C", "price": 1.0, "createdAt": "2024-01-01T00:00:00Z"}),
                false,
            )
            .await
            .unwrap();

        let listed = aggregator(&store).list(&CatalogQuery::all()).await.unwrap();
        assert_eq!(ids(&listed), vec!["known", "renamed", "bare"]);
        assert!(listed.iter().all(|e| e.location.is_draft()));

        let empty_directory = CatalogAggregator::new(
            store.clone(),
            StaticCategoryDirectory::default(),
            vec![Namespace::parse("retailers").unwrap()],
            CollectionPath::root("drafts").unwrap(),
        );
        assert_eq!(empty_directory.list(&CatalogQuery::all()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn loosely_typed_records_are_listed() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let path = CollectionPath::live_products(
            &Namespace::parse("retailers").unwrap(),
            &Slug::from_name("Tiles"),
        )
        .doc("loose");
        store
            .set(&path, json!({"title": "Loose", "stock": 5.0, "status": "published"}), false)
            .await
            .unwrap();

        let entries = aggregator(&store).list(&CatalogQuery::all()).await.unwrap();
        assert_eq!(ids(&entries), vec!["loose"]);
        assert_eq!(entries[0].product.stock, 5);
        assert_eq!(entries[0].product.price, 0.0);
    }

    #[tokio::test]
    async fn unreadable_live_table_contributes_nothing() {
        let store = Arc::new(InMemoryDocumentStore::new());
        put_live(&store, "retailers", "tiles", "a", "2024-01-01T00:00:00Z").await;
        put_live(&store, "buyers", "tiles", "b", "2024-01-02T00:00:00Z").await;
        store.fail_under("buyers/", FaultOp::Read);

        let entries = aggregator(&store).list(&CatalogQuery::all()).await.unwrap();
        assert_eq!(ids(&entries), vec!["a"]);
        assert_eq!(entries[0].location.to_string(), "retailers/tiles");
    }

    #[tokio::test]
    async fn unreadable_drafts_table_fails_the_listing() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.set_unavailable(true);
        let err = aggregator(&store).list(&CatalogQuery::all()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[tokio::test]
    async fn search_filters_before_limit() {
        let store = Arc::new(InMemoryDocumentStore::new());
        put_live(&store, "retailers", "tiles", "a", "2024-01-03T00:00:00Z").await;
        put_draft(&store, "b", "retailers", "Tiles", "2024-01-02T00:00:00Z").await;
        put_draft(&store, "c", "retailers", "Tiles", "2024-01-01T00:00:00Z").await;

        let filter = ProductFilter::default().stock_status(StockStatus::OutOfStock);
        let found = aggregator(&store)
            .search(&CatalogQuery::all().limit(1), &filter)
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["b"]);
    }
}
