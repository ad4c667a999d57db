use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Stock level below which a product is reported as running low
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// A catalog product as stored by the hosted backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: u32,
    /// Average rating on a 0-5 scale
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews_count: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Category label embedded by search queries
    #[serde(
        default,
        rename = "categories",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<CategoryLabel>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryLabel {
    pub name: String,
}

/// A product category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_decodes_with_minimal_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "Trail Runner",
            "price": 129.9
        }))
        .unwrap();

        assert_eq!(product.brand, "");
        assert_eq!(product.category_id, None);
        assert_eq!(product.stock, 0);
        assert_eq!(product.created_at, None);
        assert!(!product.in_stock());
    }

    #[test]
    fn test_product_treats_null_columns_as_defaults() {
        let product: Product = serde_json::from_value(json!({
            "id": "p2",
            "name": "Canvas Tote",
            "price": 40.0,
            "brand": null,
            "description": null,
            "rating": null
        }))
        .unwrap();

        assert_eq!(product.brand, "");
        assert_eq!(product.description, "");
        assert_eq!(product.rating, 0.0);
    }

    #[test]
    fn test_product_decodes_embedded_category_label() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "Trail Runner",
            "price": 129.9,
            "category_id": "shoes",
            "categories": { "name": "Shoes" },
            "created_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(product.category.map(|c| c.name), Some("Shoes".to_string()));
        assert!(product.created_at.is_some());
    }
}
