use std::sync::Arc;

use crate::{
    db::{fetch, Backend, Filter, RowQuery, SortOrder, Table},
    error::AppResult,
    models::{ActivityEvent, Order, Product},
    services::preferences::{self, PreferenceProfile},
};

/// Embedded projection that brings each order's items and their product snapshot
const ORDER_HISTORY_SELECT: &str = "*, order_items(*, products(*))";

/// Extra candidates read past `limit` so equal ratings at the cut-off are
/// settled by brand affinity rather than backend order
const CANDIDATE_OVERFETCH: usize = 10;

/// Tunables for candidate selection
#[derive(Debug, Clone)]
pub struct RecommendationSettings {
    /// How many of the top categories feed the candidate query
    pub category_fanout: usize,
    /// How many recent activity events are read per user
    pub activity_history_limit: usize,
    /// Cap on orders read per user; `None` reads the whole history
    pub order_history_limit: Option<usize>,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            category_fanout: 3,
            activity_history_limit: 50,
            order_history_limit: None,
        }
    }
}

/// Personalized product recommendations
///
/// Candidates come from the user's most purchased categories and are ranked
/// by rating. Equal ratings are broken by the user's brand affinity. This is a
/// heuristic stand-in for a learned ranker: callers only depend on
/// `(user id, limit) -> ranked products`.
#[derive(Clone)]
pub struct RecommendationProvider {
    backend: Arc<dyn Backend>,
    settings: RecommendationSettings,
}

impl RecommendationProvider {
    pub fn new(backend: Arc<dyn Backend>, settings: RecommendationSettings) -> Self {
        Self { backend, settings }
    }

    /// Returns at most `limit` products ranked for the user
    ///
    /// Never fails: a user without history, or any backend failure while
    /// reading history, yields an empty list so the caller can fall back to
    /// generic featured products.
    #[tracing::instrument(skip(self))]
    pub async fn recommend(&self, user_id: &str, limit: usize) -> Vec<Product> {
        if limit == 0 {
            return Vec::new();
        }

        let (orders, activity) = tokio::join!(
            self.fetch_orders(user_id),
            self.fetch_recent_activity(user_id)
        );

        let (orders, activity) = match (orders, activity) {
            (Ok(orders), Ok(activity)) => (orders, activity),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "History unavailable, skipping personalization");
                return Vec::new();
            }
        };

        let profile = preferences::analyze(&orders);

        let fanout = self.settings.category_fanout.min(profile.categories.len());
        tracing::debug!(
            orders = orders.len(),
            activity_events = activity.len(),
            top_categories = ?&profile.categories[..fanout],
            "Preference profile built"
        );

        if profile.categories.is_empty() {
            return Vec::new();
        }

        match self.fetch_candidates(&profile, limit).await {
            Ok(candidates) => {
                let ranked = rank_candidates(candidates, &profile, limit);
                tracing::info!(returned = ranked.len(), "Recommendations generated");
                ranked
            }
            Err(e) => {
                tracing::warn!(error = %e, "Candidate query failed");
                Vec::new()
            }
        }
    }

    /// The user's orders with items, newest first
    async fn fetch_orders(&self, user_id: &str) -> AppResult<Vec<Order>> {
        let mut query = RowQuery::new()
            .select(ORDER_HISTORY_SELECT)
            .filter(Filter::eq("user_id", user_id))
            .order_by(SortOrder::desc("created_at"));
        if let Some(cap) = self.settings.order_history_limit {
            query = query.limit(cap);
        }

        fetch(self.backend.as_ref(), Table::Orders, &query).await
    }

    /// The user's most recent activity events, newest first
    async fn fetch_recent_activity(&self, user_id: &str) -> AppResult<Vec<ActivityEvent>> {
        let query = RowQuery::new()
            .filter(Filter::eq("user_id", user_id))
            .order_by(SortOrder::desc("created_at"))
            .limit(self.settings.activity_history_limit);

        fetch(self.backend.as_ref(), Table::UserActivity, &query).await
    }

    /// Highest rated products within the user's top categories
    async fn fetch_candidates(
        &self,
        profile: &PreferenceProfile,
        limit: usize,
    ) -> AppResult<Vec<Product>> {
        let top_categories = profile
            .categories
            .iter()
            .take(self.settings.category_fanout)
            .map(String::as_str);

        let query = RowQuery::new()
            .filter(Filter::is_in("category_id", top_categories))
            .order_by(SortOrder::desc("rating"))
            .limit(limit.saturating_add(CANDIDATE_OVERFETCH));

        fetch(self.backend.as_ref(), Table::Products, &query).await
    }
}

/// Orders candidates by rating, breaking ties by brand affinity, and caps the list
fn rank_candidates(
    mut candidates: Vec<Product>,
    profile: &PreferenceProfile,
    limit: usize,
) -> Vec<Product> {
    candidates.sort_by(|a, b| {
        b.rating.total_cmp(&a.rating).then_with(|| {
            let rank_a = profile.brand_rank(&a.brand).unwrap_or(usize::MAX);
            let rank_b = profile.brand_rank(&b.brand).unwrap_or(usize::MAX);
            rank_a.cmp(&rank_b)
        })
    });
    candidates.truncate(limit);
    candidates
}
