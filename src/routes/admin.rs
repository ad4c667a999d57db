use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{middleware::request_id::RequestId, models::AdminStats, routes::AppState};

/// Handler for the admin dashboard figures
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> Json<AdminStats> {
    let stats = state.dashboard.stats().await;

    tracing::info!(
        request_id = %request_id,
        total_orders = stats.total_orders,
        low_stock = stats.low_stock_products.len(),
        "Dashboard stats computed"
    );

    Json(stats)
}
