use serde::{Deserialize, Serialize};

use super::Product;
use crate::error::{AppError, AppResult};

/// A product and the quantity held in a cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Shopping cart state. Lines keep the order in which products were first added.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of a product, merging with an existing line
    ///
    /// The resulting line quantity is capped at the product's stock. Sold-out
    /// products and zero quantities are rejected.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> AppResult<()> {
        if quantity == 0 {
            return Err(AppError::InvalidInput(
                "Quantity must be at least 1".to_string(),
            ));
        }
        if !product.in_stock() {
            return Err(AppError::InvalidInput(format!(
                "Product {} is out of stock",
                product.id
            )));
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            // Refresh the snapshot so price and stock follow the catalog
            existing.product = product.clone();
            existing.quantity = existing.quantity.saturating_add(quantity).min(product.stock);
        } else {
            self.items.push(CartItem {
                product: product.clone(),
                quantity: quantity.min(product.stock),
            });
        }

        Ok(())
    }

    /// Sets the quantity of a line; zero removes it
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> AppResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product.id == product_id)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not in cart", product_id)))?;
        item.quantity = quantity.min(item.product.stock);
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) -> AppResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        if self.items.len() == before {
            return Err(AppError::NotFound(format!(
                "Product {} not in cart",
                product_id
            )));
        }
        Ok(())
    }

    /// Sum of price times quantity over all lines
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Total number of units in the cart
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
