use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

pub mod activity;
pub mod admin;
pub mod cart;
pub mod products;
pub mod recommendations;
mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog
        .route("/products/search", get(products::search))
        .route("/products/featured", get(products::featured))
        .route("/products/:product_id", get(products::get_product))
        .route("/categories", get(products::categories))
        // Personalization
        .route("/recommendations/:user_id", get(recommendations::recommend))
        .route("/activity", post(activity::record))
        // Cart
        .route("/cart/:user_id", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/:user_id/items", post(cart::add_item))
        .route(
            "/cart/:user_id/items/:product_id",
            put(cart::update_item).delete(cart::remove_item),
        )
        // Admin
        .route("/admin/stats", get(admin::stats))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
