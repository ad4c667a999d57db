use std::sync::Arc;

use crate::{
    db::{fetch, Backend, Filter, RowQuery, SortOrder, Table},
    models::{Product, SearchFilters, SortKey, ACTIVITY_SEARCH},
    services::activity::ActivityRecorder,
};

/// Columns matched by free-text search
const TEXT_COLUMNS: [&str; 3] = ["name", "description", "brand"];

/// Product projection with the category label embedded
const SEARCH_SELECT: &str = "*, categories(name)";

/// Filtered, sorted product search
///
/// Text matching and filtering are delegated to the backend; this only
/// translates input into a query and records the search for personalization.
#[derive(Clone)]
pub struct SearchGateway {
    backend: Arc<dyn Backend>,
    activity: ActivityRecorder,
}

impl SearchGateway {
    pub fn new(backend: Arc<dyn Backend>, activity: ActivityRecorder) -> Self {
        Self { backend, activity }
    }

    /// Searches products by free text and structured filters
    ///
    /// A backend failure is logged and returns an empty list. When both a user
    /// and a non-empty query are present a "search" activity is recorded once
    /// the query has resolved.
    #[tracing::instrument(skip(self, filters), fields(filters = ?filters))]
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        user_id: Option<&str>,
    ) -> Vec<Product> {
        let text = query.trim();
        let row_query = build_query(text, filters);

        let products = match fetch(self.backend.as_ref(), Table::Products, &row_query).await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(error = %e, "Product search failed");
                Vec::new()
            }
        };

        tracing::info!(results = products.len(), "Search completed");

        if let Some(user_id) = user_id {
            if !text.is_empty() {
                self.activity.record(user_id, ACTIVITY_SEARCH, None);
            }
        }

        products
    }
}

/// Translates search input into a backend query
///
/// Text matches any of name, description or brand. Filters are AND-combined
/// on top of it.
pub(crate) fn build_query(text: &str, filters: &SearchFilters) -> RowQuery {
    let mut query = RowQuery::new().select(SEARCH_SELECT);

    if !text.is_empty() {
        query = query.filter(Filter::any_contains(&TEXT_COLUMNS, text));
    }
    if let Some(category) = &filters.category {
        query = query.filter(Filter::eq("category_id", category.as_str()));
    }
    if let Some(brand) = &filters.brand {
        query = query.filter(Filter::eq("brand", brand.as_str()));
    }
    if let Some(price_min) = filters.price_min {
        query = query.filter(Filter::gte("price", price_min));
    }
    if let Some(price_max) = filters.price_max {
        query = query.filter(Filter::lte("price", price_max));
    }
    if let Some(rating) = filters.rating {
        query = query.filter(Filter::gte("rating", rating));
    }

    query.order_by(sort_order(filters.sort_by))
}

fn sort_order(sort_by: Option<SortKey>) -> SortOrder {
    match sort_by {
        Some(SortKey::PriceAsc) => SortOrder::asc("price"),
        Some(SortKey::PriceDesc) => SortOrder::desc("price"),
        Some(SortKey::Rating) => SortOrder::desc("rating"),
        Some(SortKey::Popularity) => SortOrder::desc("reviews_count"),
        None => SortOrder::desc("created_at"),
    }
}
