use serde::{Deserialize, Serialize};

/// Result ordering requested by a product search
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    /// Highest rated first
    Rating,
    /// Most reviewed first
    Popularity,
}

/// Structured product filters. `None` means no constraint on that dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    /// Exact category id
    #[serde(default)]
    pub category: Option<String>,
    /// Exact brand name
    #[serde(default)]
    pub brand: Option<String>,
    /// Inclusive lower price bound
    #[serde(default)]
    pub price_min: Option<f64>,
    /// Inclusive upper price bound
    #[serde(default)]
    pub price_max: Option<f64>,
    /// Inclusive minimum rating
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub sort_by: Option<SortKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_wire_names() {
        let keys: Vec<SortKey> =
            serde_json::from_str(r#"["price_asc", "price_desc", "rating", "popularity"]"#).unwrap();
        assert_eq!(
            keys,
            vec![
                SortKey::PriceAsc,
                SortKey::PriceDesc,
                SortKey::Rating,
                SortKey::Popularity
            ]
        );
    }

    #[test]
    fn test_missing_filters_decode_as_unconstrained() {
        let filters: SearchFilters = serde_json::from_str("{}").unwrap();
        assert_eq!(filters, SearchFilters::default());

        let filters: SearchFilters =
            serde_json::from_str(r#"{"price_min": 100, "sort_by": "rating"}"#).unwrap();
        assert_eq!(filters.price_min, Some(100.0));
        assert_eq!(filters.sort_by, Some(SortKey::Rating));
        assert_eq!(filters.brand, None);
    }
}
