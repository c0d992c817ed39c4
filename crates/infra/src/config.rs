//! Catalog configuration loaded from environment variables.

use thiserror::Error;

use storefront_catalog::Namespace;

use crate::store::CollectionPath;

pub const DEFAULT_NAMESPACES: &str = "retailers,buyers";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Storage layout and process settings for the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Known namespaces, in enumeration order.
    pub namespaces: Vec<Namespace>,
    pub drafts_collection: CollectionPath,
    pub categories_collection: CollectionPath,
    pub attributes_collection: CollectionPath,
    pub log_level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            namespaces: DEFAULT_NAMESPACES
                .split(',')
                .filter_map(|ns| Namespace::parse(ns).ok())
                .collect(),
            drafts_collection: CollectionPath::trusted("drafts"),
            categories_collection: CollectionPath::trusted("categories"),
            attributes_collection: CollectionPath::trusted("attributes"),
            log_level: "info".to_string(),
        }
    }
}

/// Load configuration, reading a `.env` file first when one is present.
pub fn load_catalog_config() -> Result<CatalogConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_catalog_config_from_env()
}

/// Load configuration from variables already in the process environment.
pub fn load_catalog_config_from_env() -> Result<CatalogConfig, ConfigError> {
    build_catalog_config(|key| std::env::var(key))
}

fn build_catalog_config<F>(lookup: F) -> Result<CatalogConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let collection = |var: &str, default: &str| -> Result<CollectionPath, ConfigError> {
        CollectionPath::root(&or_default(var, default)).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let raw_namespaces = or_default("STOREFRONT_NAMESPACES", DEFAULT_NAMESPACES);
    let mut namespaces: Vec<Namespace> = Vec::new();
    for part in raw_namespaces.split(',').filter(|p| !p.trim().is_empty()) {
        let ns = Namespace::parse(part).map_err(|e| ConfigError::InvalidEnvVar {
            var: "STOREFRONT_NAMESPACES".to_string(),
            reason: e.to_string(),
        })?;
        if !namespaces.contains(&ns) {
            namespaces.push(ns);
        }
    }
    if namespaces.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_NAMESPACES".to_string(),
            reason: "at least one namespace is required".to_string(),
        });
    }

    Ok(CatalogConfig {
        namespaces,
        drafts_collection: collection("STOREFRONT_DRAFTS_COLLECTION", "drafts")?,
        categories_collection: collection("STOREFRONT_CATEGORIES_COLLECTION", "categories")?,
        attributes_collection: collection("STOREFRONT_ATTRIBUTES_COLLECTION", "attributes")?,
        log_level: or_default("STOREFRONT_LOG_LEVEL", "info"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn build(vars: &[(&str, &str)]) -> Result<CatalogConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        build_catalog_config(|key| map.get(key).cloned().ok_or(std::env::VarError::NotPresent))
    }

    #[test]
    fn defaults() {
        let config = build(&[]).unwrap();
        let names: Vec<_> = config.namespaces.iter().map(Namespace::as_str).collect();
        assert_eq!(names, vec!["retailers", "buyers"]);
        assert_eq!(config.drafts_collection.as_str(), "drafts");
        assert_eq!(config.categories_collection.as_str(), "categories");
        assert_eq!(config.attributes_collection.as_str(), "attributes");
        assert_eq!(config.log_level, "info");
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn namespaces_are_trimmed_and_deduplicated() {
        let config = build(&[("STOREFRONT_NAMESPACES", " wholesale, retail ,wholesale,")]).unwrap();
        let names: Vec<_> = config.namespaces.iter().map(Namespace::as_str).collect();
        assert_eq!(names, vec!["wholesale", "retail"]);
    }

    #[test]
    fn rejects_empty_namespace_list() {
        let err = build(&[("STOREFRONT_NAMESPACES", " , ")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STOREFRONT_NAMESPACES"));
    }

    #[test]
    fn rejects_nested_collection_names() {
        let err = build(&[("STOREFRONT_DRAFTS_COLLECTION", "staging/drafts")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STOREFRONT_DRAFTS_COLLECTION"));
    }
}
