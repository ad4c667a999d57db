use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Category, Product, SearchFilters, SortKey, ACTIVITY_VIEW},
    routes::AppState,
    services::catalog::DEFAULT_CATEGORY_LIMIT,
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub rating: Option<f64>,
    pub sort_by: Option<SortKey>,
    pub user_id: Option<String>,
}

impl SearchParams {
    /// Structured filters, treating blank text fields as absent
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            category: non_blank(&self.category),
            brand: non_blank(&self.brand),
            price_min: self.price_min,
            price_max: self.price_max,
            rating: self.rating,
            sort_by: self.sort_by,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ViewParams {
    pub user_id: Option<String>,
}

/// Handler for product search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Product>> {
    tracing::info!(
        request_id = %request_id,
        query = %params.q,
        "Processing search request"
    );

    let user_id = non_blank(&params.user_id);
    let products = state
        .search
        .search(&params.q, &params.filters(), user_id.as_deref())
        .await;

    Json(products)
}

/// Handler for top-rated products
pub async fn featured(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<Product>> {
    let limit = params.limit.unwrap_or(state.featured_limit);
    Json(state.catalog.featured(limit).await)
}

/// Handler for a single product. Records a view when the caller is known.
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
    Query(params): Query<ViewParams>,
) -> AppResult<Json<Product>> {
    let product = state.catalog.product(&product_id).await?;

    if let Some(user_id) = non_blank(&params.user_id) {
        state
            .activity
            .record(&user_id, ACTIVITY_VIEW, Some(&product.id));
    }

    Ok(Json(product))
}

/// Handler for the category listing
pub async fn categories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<Category>> {
    let limit = params.limit.unwrap_or(DEFAULT_CATEGORY_LIMIT);
    Json(state.catalog.categories(limit).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filters_are_dropped() {
        let params = SearchParams {
            q: "runner".to_string(),
            category: Some("  ".to_string()),
            brand: Some(" Nike ".to_string()),
            price_min: Some(10.0),
            price_max: None,
            rating: None,
            sort_by: Some(SortKey::Rating),
            user_id: Some(String::new()),
        };

        let filters = params.filters();
        assert_eq!(filters.category, None);
        assert_eq!(filters.brand.as_deref(), Some("Nike"));
        assert_eq!(filters.price_min, Some(10.0));
        assert_eq!(filters.sort_by, Some(SortKey::Rating));
        assert_eq!(non_blank(&params.user_id), None);
    }
}
