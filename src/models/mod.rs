use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

mod cart;
mod order;
mod product;
mod search;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderItem, OrderStatus, ProductSnapshot};
pub use product::{Category, CategoryLabel, Product, LOW_STOCK_THRESHOLD};
pub use search::{SearchFilters, SortKey};

/// Activity kind recorded for a product search
pub const ACTIVITY_SEARCH: &str = "search";
/// Activity kind recorded for a product page view
pub const ACTIVITY_VIEW: &str = "view";

/// Deserializes an explicit `null` column into the type's default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes a field, falling back to the type's default when the value is
/// null or of the wrong shape
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserializes a list element by element. Elements that don't fit `T` are
/// dropped with a warning; anything other than an array reads as empty.
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(elements) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value(element) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed list element");
                None
            }
        })
        .collect())
}

// ============================================================================
// User Activity
// ============================================================================

/// A single user action, appended to the activity log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEvent {
    pub user_id: String,
    /// Free-text tag such as "search" or "view"
    #[serde(rename = "activity_type")]
    pub kind: String,
    #[serde(default)]
    pub product_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEvent {
    /// Creates an event stamped with the current time
    pub fn now(user_id: impl Into<String>, kind: impl Into<String>, product_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            kind: kind.into(),
            product_id,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Admin Dashboard
// ============================================================================

/// Aggregated store statistics for the admin dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub popular_products: Vec<Product>,
    pub recent_orders: Vec<Order>,
    pub low_stock_products: Vec<Product>,
}
