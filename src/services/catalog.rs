use std::sync::Arc;

use crate::{
    db::{fetch, Backend, Filter, RowQuery, SortOrder, Table},
    error::{AppError, AppResult},
    models::{Category, Product},
};

/// Default size of the category strip on the storefront
pub const DEFAULT_CATEGORY_LIMIT: usize = 6;

/// Generic, non-personalized catalog reads
#[derive(Clone)]
pub struct CatalogService {
    backend: Arc<dyn Backend>,
}

impl CatalogService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Highest rated products. This is also the fallback when no
    /// personalized recommendations are available.
    pub async fn featured(&self, limit: usize) -> Vec<Product> {
        let query = RowQuery::new()
            .order_by(SortOrder::desc("rating"))
            .limit(limit);

        fetch(self.backend.as_ref(), Table::Products, &query)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Featured products unavailable");
                Vec::new()
            })
    }

    pub async fn categories(&self, limit: usize) -> Vec<Category> {
        let query = RowQuery::new().limit(limit);

        fetch(self.backend.as_ref(), Table::Categories, &query)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Categories unavailable");
                Vec::new()
            })
    }

    /// Looks up a single product by id
    pub async fn product(&self, product_id: &str) -> AppResult<Product> {
        let query = RowQuery::new()
            .filter(Filter::eq("id", product_id))
            .limit(1);

        fetch(self.backend.as_ref(), Table::Products, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))
    }
}
