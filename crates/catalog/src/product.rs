use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use storefront_core::{DomainError, DomainResult, Entity, ProductId};

use crate::location::Namespace;
use crate::slug::Slug;
use crate::timestamp::CreatedAt;

/// Product status lifecycle.
///
/// The status decides which physical location is authoritative: drafts live in
/// the flat drafts table, published records in exactly one live table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StockStatus {
    #[default]
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

/// Attribute value on a product: a single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    One(String),
    Many(Vec<String>),
}

impl AttributeValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(v) => vec![v.as_str()],
            Self::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().into_iter().any(|v| v == value)
    }
}

/// Product record as stored in the document store.
///
/// `db` and `category` are only present on drafts. Live records derive their
/// location from the path they are stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specifications: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub stock: u32,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default, skip_serializing_if = "CreatedAt::is_missing")]
    pub created_at: CreatedAt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
}

/// Reads any JSON number as a count, truncating fractions and clamping to
/// `0..=u32::MAX`. Non-numbers read as zero.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    let Some(JsonValue::Number(n)) = value else {
        return Ok(0);
    };
    let count = if let Some(u) = n.as_u64() {
        u.min(u64::from(u32::MAX)) as u32
    } else if let Some(i) = n.as_i64() {
        i.clamp(0, i64::from(u32::MAX)) as u32
    } else {
        n.as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.clamp(0.0, f64::from(u32::MAX)) as u32)
            .unwrap_or(0)
    };
    Ok(count)
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AsRef<Product> for Product {
    fn as_ref(&self) -> &Product {
        self
    }
}

impl Product {
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Published
    }

    /// Intended live location carried by a draft, as `(db, category slug)`.
    pub fn intended_location(&self) -> DomainResult<(Namespace, Slug)> {
        let db = self
            .db
            .as_deref()
            .ok_or_else(|| DomainError::validation(format!("draft {} has no db", self.id)))?;
        let category = self
            .category
            .as_deref()
            .map(Slug::from_name)
            .filter(|slug| !slug.is_empty())
            .ok_or_else(|| DomainError::validation(format!("draft {} has no category", self.id)))?;
        Ok((Namespace::parse(db)?, category))
    }

    /// Copy destined for a live table: published, with location fields removed.
    pub fn to_live(&self) -> Self {
        Self {
            status: ProductStatus::Published,
            db: None,
            category: None,
            ..self.clone()
        }
    }

    /// Copy destined for the drafts table, remembering where it was live.
    pub fn to_draft(&self, db: &Namespace, category: &Slug) -> Self {
        Self {
            status: ProductStatus::Draft,
            db: Some(db.as_str().to_string()),
            category: Some(category.as_str().to_string()),
            ..self.clone()
        }
    }

    /// Field-level invariants shared by creation and patching.
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if self.code.trim().is_empty() {
            return Err(DomainError::validation("code cannot be empty"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation("price must be a non-negative number"));
        }
        Ok(())
    }
}

/// Command: create a draft product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub code: String,
    pub description: String,
    pub price: f64,
    pub images: Vec<String>,
    pub specifications: String,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub stock: u32,
    pub stock_status: StockStatus,
    pub db: Namespace,
    /// Category display name or slug.
    pub category: String,
}

impl NewProduct {
    pub fn into_draft(self, id: ProductId, created_at: DateTime<Utc>) -> DomainResult<Product> {
        if Slug::from_name(&self.category).is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }

        let product = Product {
            id,
            title: self.title.trim().to_string(),
            code: self.code.trim().to_string(),
            description: self.description,
            price: self.price,
            images: self.images,
            specifications: self.specifications,
            attributes: self.attributes,
            stock: self.stock,
            stock_status: self.stock_status,
            created_at: CreatedAt::at(created_at),
            db: Some(self.db.as_str().to_string()),
            category: Some(self.category),
            status: ProductStatus::Draft,
        };
        product.validate()?;
        Ok(product)
    }
}

/// Partial update of a draft. `None` fields are left untouched; attributes are
/// upserted by name, matching a merge write of the patch document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, AttributeValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<StockStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch to a draft, checking the result still holds.
    pub fn apply_to(&self, product: &Product) -> DomainResult<Product> {
        let mut next = product.clone();
        if let Some(v) = &self.title {
            next.title = v.trim().to_string();
        }
        if let Some(v) = &self.code {
            next.code = v.trim().to_string();
        }
        if let Some(v) = &self.description {
            next.description = v.clone();
        }
        if let Some(v) = self.price {
            next.price = v;
        }
        if let Some(v) = &self.images {
            next.images = v.clone();
        }
        if let Some(v) = &self.specifications {
            next.specifications = v.clone();
        }
        if let Some(v) = &self.attributes {
            next.attributes.extend(v.clone());
        }
        if let Some(v) = self.stock {
            next.stock = v;
        }
        if let Some(v) = self.stock_status {
            next.stock_status = v;
        }
        if let Some(v) = &self.db {
            next.db = Some(Namespace::parse(v.as_str())?.as_str().to_string());
        }
        if let Some(v) = &self.category {
            if Slug::from_name(v).is_empty() {
                return Err(DomainError::validation("category cannot be empty"));
            }
            next.category = Some(v.clone());
        }
        next.validate()?;
        Ok(next)
    }
}
