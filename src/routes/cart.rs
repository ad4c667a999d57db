use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Cart, CartItem},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub total: f64,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            item_count: cart.item_count(),
            total: cart.total(),
            items: cart.items,
        }
    }
}

/// Get a user's cart
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<CartResponse> {
    Json(state.carts.get(&user_id).await.into())
}

/// Add a product to a user's cart
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<AddCartItemRequest>,
) -> AppResult<Json<CartResponse>> {
    let product = state.catalog.product(&request.product_id).await?;
    let cart = state
        .carts
        .add_item(&user_id, &product, request.quantity)
        .await?;

    tracing::debug!(
        user_id = %user_id,
        product_id = %product.id,
        item_count = cart.item_count(),
        "Cart item added"
    );

    Ok(Json(cart.into()))
}

/// Change the quantity of a cart line
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((user_id, product_id)): Path<(String, String)>,
    Json(request): Json<UpdateCartItemRequest>,
) -> AppResult<Json<CartResponse>> {
    let cart = state
        .carts
        .update_quantity(&user_id, &product_id, request.quantity)
        .await?;
    Ok(Json(cart.into()))
}

/// Remove a line from a user's cart
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> AppResult<Json<CartResponse>> {
    let cart = state.carts.remove_item(&user_id, &product_id).await?;
    Ok(Json(cart.into()))
}

/// Empty a user's cart
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> StatusCode {
    state.carts.clear(&user_id).await;
    StatusCode::NO_CONTENT
}
