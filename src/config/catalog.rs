//! Catalogue configuration loading from catalog.toml
//!
//! This module loads the initial category tree from a TOML file. The categories listed
//! there are seeded into the global scope on startup when they are missing.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Categories to seed, parents before children
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

/// Configuration for a single category
#[derive(Debug, Deserialize, Clone)]
pub struct CategorySeed {
    /// Display name of the category
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Name of the parent category, absent for roots
    #[serde(default)]
    pub parent: Option<String>,
    /// Whether the category starts active
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Path of the catalogue file, from `CATALOG_CONFIG` or `./catalog.toml`.
#[must_use]
pub fn get_catalog_path() -> PathBuf {
    std::env::var("CATALOG_CONFIG").map_or_else(|_| PathBuf::from("catalog.toml"), PathBuf::from)
}

/// Loads the catalogue from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load catalogue from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read catalogue file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_catalog_config() {
        let toml_str = r#"
            [[categories]]
            name = "Fruits"
            description = "Seasonal fruit"

            [[categories]]
            name = "Berries"
            parent = "Fruits"
            active = false
        "#;

        let config: CatalogConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].name, "Fruits");
        assert_eq!(
            config.categories[0].description.as_deref(),
            Some("Seasonal fruit")
        );
        assert!(config.categories[0].active);
        assert_eq!(config.categories[0].parent, None);

        assert_eq!(config.categories[1].parent.as_deref(), Some("Fruits"));
        assert!(!config.categories[1].active);
    }

    #[test]
    fn test_empty_catalog() {
        let config: CatalogConfig = toml::from_str("").unwrap();
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
    }
}
