use std::sync::Arc;

use crate::{
    config::Config,
    db::Backend,
    services::{
        ActivityRecorder, CartStore, CatalogService, DashboardService, RecommendationProvider,
        RecommendationSettings, SearchGateway,
    },
};

/// Shared application state
///
/// Every service holds the same injected backend; the cart store is the only
/// state owned by this process.
pub struct AppState {
    pub catalog: CatalogService,
    pub search: SearchGateway,
    pub recommendations: RecommendationProvider,
    pub dashboard: DashboardService,
    pub activity: ActivityRecorder,
    pub carts: CartStore,
    pub featured_limit: usize,
}

impl AppState {
    /// Wires every service to the given backend and activity recorder
    pub fn new(backend: Arc<dyn Backend>, activity: ActivityRecorder, config: &Config) -> Self {
        let settings = RecommendationSettings {
            category_fanout: config.recommendation_category_fanout,
            activity_history_limit: config.activity_history_limit,
            order_history_limit: config.order_history_limit,
        };

        Self {
            catalog: CatalogService::new(backend.clone()),
            search: SearchGateway::new(backend.clone(), activity.clone()),
            recommendations: RecommendationProvider::new(backend.clone(), settings),
            dashboard: DashboardService::new(backend),
            activity,
            carts: CartStore::new(),
            featured_limit: config.featured_limit,
        }
    }
}
