//! Catalog domain module.
//!
//! Business rules for products, categories, and attributes, implemented purely
//! as deterministic domain logic (no IO, no storage). Where records live and how
//! they move between the drafts table and the live tables is decided here;
//! reading and writing them is the infra crate's job.

pub mod attribute;
pub mod category;
pub mod listing;
pub mod location;
pub mod product;
pub mod search;
pub mod slug;
pub mod timestamp;

pub use attribute::{Attribute, AttributeSet, NewAttribute};
pub use category::{Category, NewCategory};
pub use listing::sort_newest_first;
pub use location::{Namespace, ProductLocation};
pub use product::{
    AttributeValue, NewProduct, Product, ProductPatch, ProductStatus, StockStatus,
};
pub use search::ProductFilter;
pub use slug::Slug;
pub use timestamp::CreatedAt;
