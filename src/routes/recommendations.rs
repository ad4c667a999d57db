use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{middleware::request_id::RequestId, models::Product, routes::AppState};

const DEFAULT_RECOMMENDATION_LIMIT: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    /// False when the list is the generic featured fallback
    pub personalized: bool,
    pub products: Vec<Product>,
}

/// Handler for recommendations endpoint
///
/// Falls back to featured products when the user has no usable history.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> Json<RecommendationResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT);

    let products = state.recommendations.recommend(&user_id, limit).await;
    if !products.is_empty() || limit == 0 {
        return Json(RecommendationResponse {
            personalized: true,
            products,
        });
    }

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        "No personalized recommendations, serving featured products"
    );

    Json(RecommendationResponse {
        personalized: false,
        products: state.catalog.featured(limit).await,
    })
}
