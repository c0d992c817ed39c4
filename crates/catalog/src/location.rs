//! Where a product record lives.

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ValueObject};

use crate::slug::Slug;

/// Top-level catalog partition (e.g. `retailers`, `buyers`).
///
/// Namespaces share the same category structure; the set of known namespaces
/// is fixed at process start.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::validation("namespace cannot be empty"));
        }
        if value.contains('/') {
            return Err(DomainError::validation(format!(
                "namespace '{value}' contains a path separator"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Namespace {}

impl core::fmt::Display for Namespace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authoritative location of a product record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductLocation {
    /// The flat drafts table.
    Draft,
    /// A live table addressed by `{db}/{category}/products`.
    Live { db: Namespace, category: Slug },
}

impl ValueObject for ProductLocation {}

impl ProductLocation {
    pub fn live(db: Namespace, category: Slug) -> Self {
        Self::Live { db, category }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl core::fmt::Display for ProductLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Draft => f.write_str("drafts"),
            Self::Live { db, category } => write!(f, "{db}/{category}"),
        }
    }
}
