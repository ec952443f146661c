use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::products::{NewProduct, ProductInput};
use crate::ConfigError;

/// Seed catalog as written in `config/catalog.yaml`.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<ProductInput>,
}

/// Load and validate the seed catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Vec<NewProduct>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

fn parse_catalog(content: &str) -> Result<Vec<NewProduct>, ConfigError> {
    let file: CatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(file)
}

fn validate_catalog(file: CatalogFile) -> Result<Vec<NewProduct>, ConfigError> {
    if file.products.is_empty() {
        return Err(ConfigError::CatalogValidation(
            "catalog must list at least one product".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    let mut products = Vec::with_capacity(file.products.len());

    for (index, entry) in file.products.into_iter().enumerate() {
        let label = if entry.name.trim().is_empty() {
            format!("entry #{}", index + 1)
        } else {
            format!("'{}'", entry.name.trim())
        };
        let product = entry
            .validate()
            .map_err(|e| ConfigError::CatalogValidation(format!("{label}: {e}")))?;

        if !seen_names.insert(product.name.to_lowercase()) {
            return Err(ConfigError::CatalogValidation(format!(
                "duplicate product name: '{}'",
                product.name
            )));
        }
        products.push(product);
    }

    Ok(products)
}

#[cfg(test)]
#[path = "catalog_file_test.rs"]
mod tests;
