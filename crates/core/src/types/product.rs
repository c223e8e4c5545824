//! Catalog product as served by the REST API.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product record.
///
/// Everything except the name is optional; the API and the bundled sample
/// data both omit fields freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    /// Whether `needle` (already lowercased) occurs in the name or description.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// Body sent to the API when creating or replacing a product.
///
/// Produced by [`crate::validation::ProductDraft`]; never carries an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductPayload {
    /// Attach an id, producing a full product record.
    #[must_use]
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            image: self.image,
            description: self.description,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_record() {
        let product: Product = serde_json::from_str(r#"{"id":"3","name":"Mũ"}"#).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert!(product.price.is_none());
        assert!(product.image.is_none());
    }

    #[test]
    fn test_serialize_skips_missing_fields() {
        let product = ProductPayload {
            name: "Áo".to_string(),
            price: None,
            image: None,
            description: None,
        };
        assert_eq!(serde_json::to_string(&product).unwrap(), r#"{"name":"Áo"}"#);
    }

    #[test]
    fn test_matches_description() {
        let product = Product {
            id: ProductId::new(1),
            name: "Tai nghe".to_string(),
            price: None,
            image: None,
            description: Some("Bluetooth, chống ồn".to_string()),
        };
        assert!(product.matches_lowercase("bluetooth"));
        assert!(product.matches_lowercase("tai"));
        assert!(!product.matches_lowercase("loa"));
    }
}
