use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Order, OrderItem};

/// Ranked purchase affinities derived from a user's order history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreferenceProfile {
    /// Category ids, most purchased first
    pub categories: Vec<String>,
    /// Brand names, most purchased first
    pub brands: Vec<String>,
}

impl PreferenceProfile {
    /// Position of a brand in the ranking, if it was ever purchased
    pub fn brand_rank(&self, brand: &str) -> Option<usize> {
        self.brands.iter().position(|b| b == brand)
    }
}

/// Derives category and brand affinities from past orders
///
/// Pure: no I/O. Items without a category or brand simply don't count towards
/// that tally.
pub fn analyze(orders: &[Order]) -> PreferenceProfile {
    PreferenceProfile {
        categories: analyze_category_preferences(orders),
        brands: analyze_brand_preferences(orders),
    }
}

/// Category ids ordered by how many line items referenced them
pub fn analyze_category_preferences(orders: &[Order]) -> Vec<String> {
    rank_by_frequency(orders, OrderItem::category_id)
}

/// Brand names ordered by how many line items referenced them
pub fn analyze_brand_preferences(orders: &[Order]) -> Vec<String> {
    rank_by_frequency(orders, OrderItem::brand)
}

/// Tallies one key per line item and ranks keys by descending count.
/// Equal counts keep the order in which keys were first seen.
fn rank_by_frequency<F>(orders: &[Order], key: F) -> Vec<String>
where
    F: Fn(&OrderItem) -> Option<&str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tally: Vec<(&str, usize)> = Vec::new();

    for item in orders.iter().flat_map(|order| order.items.iter()) {
        let Some(value) = key(item) else {
            continue;
        };

        match index.get(value) {
            Some(&slot) => tally[slot].1 += 1,
            None => {
                index.insert(value, tally.len());
                tally.push((value, 1));
            }
        }
    }

    // sort_by is stable, so first-seen order survives ties
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally.into_iter().map(|(value, _)| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductSnapshot;

    fn item(category: Option<&str>, brand: Option<&str>) -> OrderItem {
        OrderItem {
            product_id: None,
            quantity: 1,
            price: 10.0,
            product: Some(ProductSnapshot {
                category_id: category.map(str::to_string),
                brand: brand.map(str::to_string),
                ..Default::default()
            }),
        }
    }

    fn order(items: Vec<OrderItem>) -> Order {
        Order {
            items,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_orders_yield_empty_profile() {
        let profile = analyze(&[]);
        assert!(profile.categories.is_empty());
        assert!(profile.brands.is_empty());
    }

    #[test]
    fn test_shoes_outrank_bags() {
        let orders = vec![
            order(vec![item(Some("shoes"), None)]),
            order(vec![item(Some("shoes"), None), item(Some("bags"), None)]),
        ];

        assert_eq!(analyze_category_preferences(&orders), vec!["shoes", "bags"]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let orders = vec![order(vec![
            item(Some("hats"), Some("Puma")),
            item(Some("bags"), Some("Coach")),
            item(Some("socks"), Some("Adidas")),
            item(Some("bags"), Some("Adidas")),
        ])];

        assert_eq!(
            analyze_category_preferences(&orders),
            vec!["bags", "hats", "socks"]
        );
        assert_eq!(
            analyze_brand_preferences(&orders),
            vec!["Adidas", "Puma", "Coach"]
        );
    }

    #[test]
    fn test_ranking_is_a_permutation_with_non_increasing_counts() {
        let categories = ["a", "b", "c", "a", "c", "a", "d", "c", "b", "a"];
        let orders: Vec<Order> = categories
            .chunks(3)
            .map(|chunk| order(chunk.iter().map(|c| item(Some(*c), None)).collect()))
            .collect();

        let ranked = analyze_category_preferences(&orders);

        let mut distinct: Vec<&str> = categories.to_vec();
        distinct.sort();
        distinct.dedup();
        let mut sorted_ranked = ranked.clone();
        sorted_ranked.sort();
        assert_eq!(sorted_ranked, distinct);

        let counts: Vec<usize> = ranked
            .iter()
            .map(|r| categories.iter().filter(|c| **c == r.as_str()).count())
            .collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let orders = vec![
            order(vec![
                item(None, Some("Nike")),
                item(Some(""), Some("")),
                OrderItem::default(),
            ]),
            order(vec![]),
            order(vec![item(Some("shoes"), None)]),
        ];

        let profile = analyze(&orders);
        assert_eq!(profile.categories, vec!["shoes"]);
        assert_eq!(profile.brands, vec!["Nike"]);
    }

    #[test]
    fn test_brand_rank() {
        let profile = PreferenceProfile {
            categories: vec![],
            brands: vec!["Nike".to_string(), "Puma".to_string()],
        };
        assert_eq!(profile.brand_rank("Puma"), Some(1));
        assert_eq!(profile.brand_rank("Coach"), None);
    }
}
