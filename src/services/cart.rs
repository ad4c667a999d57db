use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Cart, Product},
};

/// Per-user shopping carts held in process memory
#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<RwLock<HashMap<String, Cart>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's cart; empty if they never added anything
    pub async fn get(&self, user_id: &str) -> Cart {
        let carts = self.carts.read().await;
        carts.get(user_id).cloned().unwrap_or_default()
    }

    pub async fn add_item(&self, user_id: &str, product: &Product, quantity: u32) -> AppResult<Cart> {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id.to_string()).or_default();
        cart.add_item(product, quantity)?;
        Ok(cart.clone())
    }

    pub async fn update_quantity(&self, user_id: &str, product_id: &str, quantity: u32) -> AppResult<Cart> {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id.to_string()).or_default();
        cart.update_quantity(product_id, quantity)?;
        Ok(cart.clone())
    }

    pub async fn remove_item(&self, user_id: &str, product_id: &str) -> AppResult<Cart> {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id.to_string()).or_default();
        cart.remove_item(product_id)?;
        Ok(cart.clone())
    }

    pub async fn clear(&self, user_id: &str) {
        let mut carts = self.carts.write().await;
        carts.remove(user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(id: &str, price: f64) -> Product {
        serde_json::from_value(json!({ "id": id, "name": id, "price": price, "stock": 5 })).unwrap()
    }

    #[tokio::test]
    async fn test_carts_are_isolated_per_user() {
        let store = CartStore::new();
        store.add_item("u1", &product("p1", 10.0), 2).await.unwrap();
        store.add_item("u2", &product("p2", 3.0), 1).await.unwrap();

        assert_eq!(store.get("u1").await.total(), 20.0);
        assert_eq!(store.get("u2").await.item_count(), 1);
        assert!(store.get("u3").await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_cart() {
        let store = CartStore::new();
        store.add_item("u1", &product("p1", 10.0), 1).await.unwrap();
        store.clear("u1").await;

        assert!(store.get("u1").await.is_empty());
    }
}
