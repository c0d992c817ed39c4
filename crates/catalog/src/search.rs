//! In-memory search over an already-fetched product list.

use serde::{Deserialize, Serialize};

use crate::product::{Product, StockStatus};

/// Listing filter. Every set criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring over title, code, and description.
    pub text: Option<String>,
    pub stock_status: Option<StockStatus>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// `(attribute name, value)` pair the product must carry.
    pub attribute: Option<(String, String)>,
}

impl ProductFilter {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn stock_status(mut self, status: StockStatus) -> Self {
        self.stock_status = Some(status);
        self
    }

    pub fn price_between(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribute = Some((name.into(), value.into()));
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            let hit = [&product.title, &product.code, &product.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.stock_status.is_some_and(|s| s != product.stock_status) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if let Some((name, value)) = &self.attribute {
            match product.attributes.get(name) {
                Some(v) if v.contains(value) => {}
                _ => return false,
            }
        }
        true
    }

    /// Keep matching items, preserving their order.
    pub fn apply<T: AsRef<Product>>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| self.matches(item.as_ref()))
            .collect()
    }
}
