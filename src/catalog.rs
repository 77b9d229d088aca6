//! Catalog
//!
//! The static product list shipped with the storefront, loaded from a YAML fixture.

use std::{fs, path::Path};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use thiserror::Error;

use crate::products::{Product, ProductId};

/// Category name that matches every product.
pub const ALL_CATEGORIES: &str = "All";

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The same product id is listed twice
    #[error("Duplicate product: {0}")]
    DuplicateProduct(ProductId),
}

#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: Vec<Product>,
}

/// Product catalog in listing order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog from products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateProduct`] if an id appears twice.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::default();

        for (idx, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
        }

        Ok(Self { products, index })
    }

    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or contains duplicate ids.
    pub fn from_yaml(contents: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(contents)?;

        Self::new(fixture.products)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Get a product by id.
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index
            .get(id)
            .and_then(|&idx| self.products.get(idx))
    }

    /// Iterate over products in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();

        self.products
            .iter()
            .filter_map(|product| product.category.as_deref())
            .filter(|category| seen.insert(*category))
            .collect()
    }

    /// Products in `category`. [`ALL_CATEGORIES`] matches everything.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products.iter().filter(move |product| {
            category == ALL_CATEGORIES || product.category.as_deref() == Some(category)
        })
    }

    /// Case-insensitive search over name, category and description.
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();

        if needle.is_empty() {
            return Vec::new();
        }

        self.products
            .iter()
            .filter(|product| product.matches_lowercase(&needle))
            .collect()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::prices::Price;

    use super::*;

    const FIXTURE: &str = r"
products:
  - id: 1
    name: Kennson X1 Pro
    price: 2750000
    category: Flagship
    isNew: true
    description: Revolutionary AI processor and 200MP camera system.
  - id: 3
    name: Kennson Lite 5G
    price: 1350000
    category: Budget
  - id: 4
    name: MatePhone Fold Z
    price: 3550000
    category: Foldable
    description: Expands to a tablet-sized experience.
  - id: 6
    name: MatePhone S23
    price: 2200000
    category: Flagship
";

    #[test]
    fn loads_products_in_order() -> TestResult {
        let catalog = Catalog::from_yaml(FIXTURE)?;

        let names: Vec<_> = catalog.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(
            names,
            [
                "Kennson X1 Pro",
                "Kennson Lite 5G",
                "MatePhone Fold Z",
                "MatePhone S23"
            ]
        );

        let flagship = catalog.get(&ProductId::new("1")).ok_or("missing product")?;
        assert_eq!(flagship.price, Price::new(2_750_000));
        assert_eq!(flagship.extra.get("isNew"), Some(&json!(true)));

        Ok(())
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() -> TestResult {
        let catalog = Catalog::from_yaml(FIXTURE)?;

        assert_eq!(catalog.categories(), ["Flagship", "Budget", "Foldable"]);

        Ok(())
    }

    #[test]
    fn filters_by_category() -> TestResult {
        let catalog = Catalog::from_yaml(FIXTURE)?;

        assert_eq!(catalog.in_category("Flagship").count(), 2);
        assert_eq!(catalog.in_category(ALL_CATEGORIES).count(), 4);
        assert_eq!(catalog.in_category("Compact").count(), 0);

        Ok(())
    }

    #[test]
    fn search_is_case_insensitive() -> TestResult {
        let catalog = Catalog::from_yaml(FIXTURE)?;

        let ids: Vec<_> = catalog
            .search("  MATEPHONE ")
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();

        assert_eq!(ids, ["4", "6"]);
        assert_eq!(catalog.search("tablet").len(), 1);
        assert!(catalog.search("   ").is_empty());

        Ok(())
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = Catalog::from_yaml(
            "products:\n  - {id: 1, name: A, price: 1}\n  - {id: 1, name: B, price: 2}\n",
        );

        assert!(matches!(result, Err(CatalogError::DuplicateProduct(id)) if id.as_str() == "1"));
    }
}
