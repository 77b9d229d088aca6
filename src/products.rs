//! Products

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::prices::Price;

/// Product identifier.
///
/// Backend products carry string ids, catalogue fixtures carry integer ids. Both are
/// normalised to a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => Self(id),
            RawId::Number(id) => Self(id.to_string()),
        })
    }
}

/// Product
///
/// Fields not modelled explicitly are kept in [`Product::extra`] so they survive a trip
/// through the cart and persisted storage unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    #[serde(alias = "_id")]
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Unit price
    pub price: Price,

    /// Image URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Category, e.g. `Flagship` or `Budget`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Long-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Any other descriptive fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product with only the required fields set.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: impl Into<Price>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: price.into(),
            image: None,
            category: None,
            description: None,
            extra: Map::new(),
        }
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the image URI.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Case-insensitive substring match over name, category and description.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        let haystacks = [
            Some(self.name.as_str()),
            self.category.as_deref(),
            self.description.as_deref(),
        ];

        haystacks
            .into_iter()
            .flatten()
            .any(|haystack| haystack.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn id_accepts_strings_and_integers() -> TestResult {
        let from_text: ProductId = serde_json::from_value(json!("65f1c0ffee"))?;
        let from_number: ProductId = serde_json::from_value(json!(7))?;

        assert_eq!(from_text, ProductId::new("65f1c0ffee"));
        assert_eq!(from_number, ProductId::new("7"));

        Ok(())
    }

    #[test]
    fn deserializes_backend_underscore_id() -> TestResult {
        let product: Product = serde_json::from_value(json!({
            "_id": "abc123",
            "name": "MatePhone Ultra",
            "price": 2_450_000,
            "category": "Flagship",
        }))?;

        assert_eq!(product.id, ProductId::new("abc123"));
        assert_eq!(product.price, Price::new(2_450_000));
        assert_eq!(product.category.as_deref(), Some("Flagship"));
        assert!(product.extra.is_empty());

        Ok(())
    }

    #[test]
    fn unknown_fields_are_kept_verbatim() -> TestResult {
        let value = json!({
            "id": "P1",
            "name": "Kennson X1 Pro",
            "price": 2_750_000,
            "isNew": true,
            "stock": 4,
        });

        let product: Product = serde_json::from_value(value.clone())?;

        assert_eq!(product.extra.get("isNew"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&product)?, value);

        Ok(())
    }

    #[test]
    fn matches_lowercase_checks_all_text_fields() {
        let product = Product::new("1", "Kennson Nova", 1_900_000_u64)
            .with_category("Mid-range")
            .with_description("Beautiful design meets powerful performance.");

        assert!(product.matches_lowercase("nova"));
        assert!(product.matches_lowercase("mid-"));
        assert!(product.matches_lowercase("powerful"));
        assert!(!product.matches_lowercase("fold"));
    }
}
