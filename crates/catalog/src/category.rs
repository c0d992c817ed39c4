use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, Entity};

use crate::slug::Slug;

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Category {
    /// Path segment for this category's live tables, derived from the current name.
    pub fn slug(&self) -> Slug {
        Slug::from_name(&self.name)
    }

    /// Rename, returning the slug the category had before.
    pub fn rename(&mut self, name: &str) -> DomainResult<Slug> {
        let name = validate_name(name)?;
        let previous = self.slug();
        self.name = name;
        Ok(previous)
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: create a category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl NewCategory {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn into_category(self, id: CategoryId) -> DomainResult<Category> {
        Ok(Category {
            id,
            name: validate_name(&self.name)?,
            description: self.description.filter(|d| !d.trim().is_empty()),
            image: self.image.filter(|i| !i.trim().is_empty()),
        })
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("category name cannot be empty"));
    }
    if name.contains('/') {
        return Err(DomainError::validation("category name cannot contain '/'"));
    }
    Ok(name.to_string())
}
