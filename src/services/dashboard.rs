use serde::Deserialize;
use std::sync::Arc;

use crate::{
    db::{fetch, Backend, Filter, RowQuery, SortOrder, Table},
    error::AppResult,
    models::{AdminStats, Order, Product, LOW_STOCK_THRESHOLD},
};

const POPULAR_PRODUCTS_LIMIT: usize = 5;
const RECENT_ORDERS_LIMIT: usize = 10;
const LOW_STOCK_LIMIT: usize = 10;

/// Only the column needed to sum revenue
#[derive(Debug, Deserialize)]
struct OrderTotal {
    #[serde(default)]
    total_amount: Option<f64>,
}

/// Aggregates store-wide statistics for the admin dashboard
#[derive(Clone)]
pub struct DashboardService {
    backend: Arc<dyn Backend>,
}

impl DashboardService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Gathers every dashboard figure concurrently
    ///
    /// Each figure degrades on its own: a failed read reports zero or an empty
    /// list and the rest of the dashboard still renders.
    pub async fn stats(&self) -> AdminStats {
        let backend = self.backend.as_ref();

        let popular_query = RowQuery::new()
            .order_by(SortOrder::desc("rating"))
            .limit(POPULAR_PRODUCTS_LIMIT);
        let recent_query = RowQuery::new()
            .select("*, order_items(*, products(name, image_url))")
            .order_by(SortOrder::desc("created_at"))
            .limit(RECENT_ORDERS_LIMIT);
        let low_stock_query = RowQuery::new()
            .filter(Filter::lt("stock", f64::from(LOW_STOCK_THRESHOLD)))
            .order_by(SortOrder::asc("stock"))
            .limit(LOW_STOCK_LIMIT);

        let (total_users, total_orders, total_revenue, popular, recent, low_stock) = tokio::join!(
            backend.count(Table::Users, &[]),
            backend.count(Table::Orders, &[]),
            self.total_revenue(),
            fetch::<Product>(backend, Table::Products, &popular_query),
            fetch::<Order>(backend, Table::Orders, &recent_query),
            fetch::<Product>(backend, Table::Products, &low_stock_query),
        );

        AdminStats {
            total_users: or_default("total_users", total_users),
            total_orders: or_default("total_orders", total_orders),
            total_revenue: or_default("total_revenue", total_revenue),
            popular_products: or_default("popular_products", popular),
            recent_orders: or_default("recent_orders", recent),
            low_stock_products: or_default("low_stock_products", low_stock),
        }
    }

    async fn total_revenue(&self) -> AppResult<f64> {
        let query = RowQuery::new().select("id, total_amount");
        let totals: Vec<OrderTotal> = fetch(self.backend.as_ref(), Table::Orders, &query).await?;
        Ok(totals.iter().filter_map(|o| o.total_amount).sum())
    }
}

fn or_default<T: Default>(figure: &str, result: AppResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(figure, error = %e, "Dashboard figure unavailable");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MemoryBackend, MockBackend},
        error::AppError,
    };
    use serde_json::json;

    fn backend() -> MemoryBackend {
        MemoryBackend::with_tables([
            (
                Table::Users,
                vec![json!({ "id": "u1" }), json!({ "id": "u2" }), json!({ "id": "u3" })],
            ),
            (
                Table::Orders,
                vec![
                    json!({ "id": "o1", "user_id": "u1", "total_amount": 120.5, "created_at": "2024-01-01T00:00:00Z" }),
                    json!({ "id": "o2", "user_id": "u2", "total_amount": 79.5, "created_at": "2024-02-01T00:00:00Z" }),
                    json!({ "id": "o3", "user_id": "u2", "total_amount": null, "created_at": "2024-03-01T00:00:00Z" }),
                ],
            ),
            (
                Table::Products,
                vec![
                    json!({ "id": "p1", "name": "Runner", "price": 100.0, "rating": 4.1, "stock": 40 }),
                    json!({ "id": "p2", "name": "Tote", "price": 80.0, "rating": 4.9, "stock": 3 }),
                    json!({ "id": "p3", "name": "Cap", "price": 20.0, "rating": 3.2, "stock": 0 }),
                    json!({ "id": "p4", "name": "Sock", "price": 5.0, "rating": 2.0, "stock": 10 }),
                ],
            ),
        ])
    }

    #[tokio::test]
    async fn test_stats_aggregate_backend_data() {
        let dashboard = DashboardService::new(Arc::new(backend()));
        let stats = dashboard.stats().await;

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.total_revenue, 200.0);
        assert_eq!(stats.popular_products[0].id, "p2");
        assert_eq!(stats.popular_products.len(), 4);

        let recent: Vec<&str> = stats.recent_orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(recent, vec!["o3", "o2", "o1"]);

        let low: Vec<&str> = stats.low_stock_products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(low, vec!["p3", "p2"]);
    }

    #[tokio::test]
    async fn test_failed_figures_degrade_independently() {
        let mut mock = MockBackend::new();
        mock.expect_count()
            .returning(|table, _| match table {
                Table::Users => Ok(42),
                _ => Err(AppError::Backend("count failed".to_string())),
            });
        mock.expect_query()
            .returning(|_, _| Err(AppError::Backend("query failed".to_string())));

        let stats = DashboardService::new(Arc::new(mock)).stats().await;

        assert_eq!(stats.total_users, 42);
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.total_revenue, 0.0);
        assert!(stats.popular_products.is_empty());
        assert!(stats.recent_orders.is_empty());
        assert!(stats.low_stock_products.is_empty());
    }
}
