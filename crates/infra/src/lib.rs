//! Infrastructure layer: document store boundary, config, and the catalog
//! services that read and move product records.

pub mod aggregator;
pub mod attributes;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod error;
pub mod locator;
pub mod store;
pub mod transition;


pub use aggregator::{CatalogAggregator, CatalogEntry, CatalogQuery};
pub use attributes::AttributeRegistry;
pub use catalog::Catalog;
pub use categories::{CategoryDirectory, StaticCategoryDirectory, StoreCategoryDirectory};
pub use config::{CatalogConfig, ConfigError, load_catalog_config, load_catalog_config_from_env};
pub use error::{CatalogError, TransitionStep};
pub use locator::{LocatedProduct, ProductLocator};
pub use transition::PublishWorkflow;
