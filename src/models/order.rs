use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{lenient, lenient_seq};

/// Lifecycle status of an order. Transitions are owned by the backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// A placed order with its line items
///
/// Every field is optional on the wire: orders are read-only here and feed
/// preference analysis, which must tolerate partial rows. A malformed field
/// reads as its default and a line item that isn't an object is dropped on
/// its own, so sibling items always survive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub total_amount: f64,
    #[serde(
        default,
        rename = "order_items",
        alias = "items",
        deserialize_with = "lenient_seq"
    )]
    pub items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "lenient")]
    pub tracking_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One line of an order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    #[serde(default, deserialize_with = "lenient")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: u32,
    /// Unit price at the time of the order
    #[serde(default, deserialize_with = "lenient")]
    pub price: f64,
    #[serde(
        default,
        rename = "products",
        alias = "product",
        deserialize_with = "lenient"
    )]
    pub product: Option<ProductSnapshot>,
}

impl OrderItem {
    /// Category of the ordered product, if the snapshot carries a non-empty one
    pub fn category_id(&self) -> Option<&str> {
        self.product
            .as_ref()
            .and_then(|p| p.category_id.as_deref())
            .filter(|c| !c.is_empty())
    }

    /// Brand of the ordered product, if the snapshot carries a non-empty one
    pub fn brand(&self) -> Option<&str> {
        self.product
            .as_ref()
            .and_then(|p| p.brand.as_deref())
            .filter(|b| !b.is_empty())
    }
}

/// Denormalized product fields embedded in an order item
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
}
