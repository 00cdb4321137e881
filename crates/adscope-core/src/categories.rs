use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One listing category: a human label and the URL of its first listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub label: String,
    pub url: String,
}

impl CategoryConfig {
    fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_owned(),
            url: url.to_owned(),
        }
    }

    /// Category identifier: the last path segment of the URL
    /// (`.../categorie/vetements-homme` → `"vetements-homme"`).
    #[must_use]
    pub fn id(&self) -> String {
        category_id_from_url(&self.url)
    }
}

/// Extracts the category identifier from a listing URL.
///
/// Query strings, fragments and trailing slashes are ignored. Returns an empty
/// string when the URL has no path segment.
#[must_use]
pub fn category_id_from_url(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();
    let trimmed = without_query.trim_end_matches('/');

    let after_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    match after_scheme.split_once('/') {
        Some((_, path)) => path.rsplit('/').next().unwrap_or_default().to_owned(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<CategoryConfig>,
}

/// The eight CoinAfrique Senegal categories, in display order.
#[must_use]
pub fn builtin_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new(
            "Vêtements Homme",
            "https://sn.coinafrique.com/categorie/vetements-homme",
        ),
        CategoryConfig::new(
            "Chaussures Homme",
            "https://sn.coinafrique.com/categorie/chaussures-homme",
        ),
        CategoryConfig::new(
            "Vêtements Enfants",
            "https://sn.coinafrique.com/categorie/vetements-enfants",
        ),
        CategoryConfig::new(
            "Chaussures Enfants",
            "https://sn.coinafrique.com/categorie/chaussures-enfants",
        ),
        CategoryConfig::new(
            "Vêtements Femme",
            "https://sn.coinafrique.com/categorie/vetements-femme",
        ),
        CategoryConfig::new(
            "Chaussures Femme",
            "https://sn.coinafrique.com/categorie/chaussures-femme",
        ),
        CategoryConfig::new(
            "Téléphones",
            "https://sn.coinafrique.com/categorie/telephones",
        ),
        CategoryConfig::new(
            "Ordinateurs",
            "https://sn.coinafrique.com/categorie/ordinateurs",
        ),
    ]
}

/// Read-only, ordered mapping from category labels to listing URLs.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<CategoryConfig>,
}

impl CategoryRegistry {
    /// Registry holding [`builtin_categories`].
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            categories: builtin_categories(),
        }
    }

    /// Loads the registry from `path` when given, otherwise the built-in one.
    ///
    /// # Errors
    ///
    /// Propagates [`load_categories`] errors.
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Ok(Self {
                categories: load_categories(path)?.categories,
            }),
            None => Ok(Self::builtin()),
        }
    }

    /// Finds a category by label (case-insensitive) or by identifier.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&CategoryConfig> {
        let key = key.trim();
        let lower = key.to_lowercase();
        self.categories
            .iter()
            .find(|c| c.label.to_lowercase() == lower)
            .or_else(|| self.categories.iter().find(|c| c.id() == key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryConfig> {
        self.categories.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Load and validate a category registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CategoriesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CategoriesFileParse)?;

    validate_categories(&file.categories)?;

    Ok(file)
}

fn validate_categories(categories: &[CategoryConfig]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category is required".to_string(),
        ));
    }

    let mut seen_labels = HashSet::new();
    let mut seen_ids = HashSet::new();

    for category in categories {
        if category.label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category label must be non-empty".to_string(),
            ));
        }

        if !category.url.starts_with("https://") && !category.url.starts_with("http://") {
            return Err(ConfigError::Validation(format!(
                "category '{}' has non-http URL '{}'",
                category.label, category.url
            )));
        }

        let id = category.id();
        if id.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' URL '{}' has no path segment to identify it",
                category.label, category.url
            )));
        }

        if !seen_labels.insert(category.label.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category label: '{}'",
                category.label
            )));
        }

        if !seen_ids.insert(id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category id: '{}' (from category '{}')",
                id, category.label
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
