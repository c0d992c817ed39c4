use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storefront_core::{AttributeId, DomainError, DomainResult, Entity};

use crate::product::AttributeValue;
use crate::slug::Slug;

/// Attribute definition: a name and the values a product may carry for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    pub values: Vec<String>,
    /// Category (display name or slug) the attribute applies to.
    pub category: String,
}

impl Attribute {
    pub fn allows(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn applies_to(&self, category: &Slug) -> bool {
        Slug::from_name(&self.category) == *category
    }
}

impl Entity for Attribute {
    type Id = AttributeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: define an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttribute {
    pub name: String,
    pub values: Vec<String>,
    pub category: String,
}

impl NewAttribute {
    pub fn into_attribute(self, id: AttributeId) -> DomainResult<Attribute> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("attribute name cannot be empty"));
        }
        if Slug::from_name(&self.category).is_empty() {
            return Err(DomainError::validation("attribute category cannot be empty"));
        }

        let mut values: Vec<String> = Vec::with_capacity(self.values.len());
        for v in self.values {
            let v = v.trim().to_string();
            if !v.is_empty() && !values.contains(&v) {
                values.push(v);
            }
        }
        if values.is_empty() {
            return Err(DomainError::validation(format!(
                "attribute '{name}' needs at least one value"
            )));
        }

        Ok(Attribute {
            id,
            name,
            values,
            category: self.category,
        })
    }
}

/// Attributes registered for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
}

impl AttributeSet {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Reject values the registry does not allow. Names without a definition
    /// pass through untouched.
    pub fn validate(&self, attributes: &BTreeMap<String, AttributeValue>) -> DomainResult<()> {
        for (name, value) in attributes {
            let Some(definition) = self.get(name) else {
                continue;
            };
            if let Some(bad) = value.values().into_iter().find(|v| !definition.allows(v)) {
                return Err(DomainError::validation(format!(
                    "value '{bad}' is not allowed for attribute '{name}'"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color() -> Attribute {
        NewAttribute {
            name: "color".to_string(),
            values: vec![" red ".to_string(), "blue".to_string(), "red".to_string(), "".to_string()],
            category: "Wall Papers".to_string(),
        }
        .into_attribute(AttributeId::parse("a1").unwrap())
        .unwrap()
    }

    #[test]
    fn values_are_trimmed_and_deduplicated() {
        assert_eq!(color().values, vec!["red".to_string(), "blue".to_string()]);
    }

    #[test]
    fn requires_at_least_one_value() {
        let err = NewAttribute {
            name: "size".to_string(),
            values: vec![" ".to_string()],
            category: "Tiles".to_string(),
        }
        .into_attribute(AttributeId::new())
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn applies_to_matches_by_slug() {
        assert!(color().applies_to(&Slug::from_name("wall-papers")));
        assert!(!color().applies_to(&Slug::from_name("tiles")));
    }

    #[test]
    fn set_validates_known_attributes_only() {
        let set = AttributeSet::new(vec![color()]);
        let ok = BTreeMap::from([
            ("color".to_string(), AttributeValue::Many(vec!["red".to_string(), "blue".to_string()])),
            ("finish".to_string(), AttributeValue::One("matte".to_string())),
        ]);
        assert!(set.validate(&ok).is_ok());

        let bad = BTreeMap::from([("color".to_string(), AttributeValue::One("green".to_string()))]);
        assert!(matches!(set.validate(&bad), Err(DomainError::Validation(_))));
    }
}
