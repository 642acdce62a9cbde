/// Recommendation engine
///
/// Pipeline per request: profile → `QueryPlanner` → terms → `Aggregator`
/// (drives the catalog) → candidates → `Scorer` → `rank`. Nothing is cached
/// between requests; the only suspension points are the catalog fetches.
use std::collections::HashSet;
use std::sync::Arc;

use tracing::instrument;

use crate::{
    models::{ItemId, PreferenceProfile, ScoredItem},
    services::catalog::CatalogGateway,
};

pub mod aggregator;
pub mod feed;
pub mod planner;
pub mod ranker;
pub mod scorer;

pub use aggregator::{Aggregator, CandidateSet};
pub use feed::{FeedRegistry, Generation, PublishedRecommendations, RecommendationFeed};
pub use planner::{QueryPlan, QueryPlanner, TermWeights};
pub use scorer::Scorer;

/// Tunable bounds for term selection and result size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub max_tag_terms: usize,
    pub max_cast_terms: usize,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_tag_terms: 3,
            max_cast_terms: 2,
            default_limit: 6,
            max_limit: 50,
        }
    }
}

impl EngineSettings {
    /// Applies the default to a missing limit and caps it at `max_limit`
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

/// Caller-side inputs of a recommendation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationQuery {
    /// The item currently on screen, never recommended back
    pub current_item_id: Option<ItemId>,
    pub exclude_ids: HashSet<ItemId>,
    pub limit: Option<usize>,
}

impl RecommendationQuery {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }
}

pub struct RecommendationEngine {
    gateway: Arc<dyn CatalogGateway>,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(gateway: Arc<dyn CatalogGateway>, settings: EngineSettings) -> Self {
        Self { gateway, settings }
    }

    /// Ranked recommendations for `profile`
    ///
    /// Never fails: catalog errors only shrink the candidate pool. An empty
    /// profile returns immediately without touching the catalog.
    #[instrument(
        skip(self, profile, query),
        fields(
            gateway = self.gateway.name(),
            tags = profile.favorite_tags.len(),
            items = profile.favorite_items.len()
        )
    )]
    pub async fn compute_recommendations(
        &self,
        profile: &PreferenceProfile,
        query: &RecommendationQuery,
    ) -> Vec<ScoredItem> {
        let plan = QueryPlanner::new(self.settings.max_tag_terms, self.settings.max_cast_terms)
            .plan(profile);
        if plan.is_empty() {
            tracing::debug!("No query terms for profile, skipping catalog");
            return Vec::new();
        }

        let mut excluded = profile.favorite_item_ids();
        excluded.extend(query.exclude_ids.iter().cloned());
        if let Some(current) = &query.current_item_id {
            excluded.insert(current.clone());
        }

        let candidates = Aggregator::new(Arc::clone(&self.gateway))
            .collect(&plan.terms(), &excluded)
            .await;

        let scored = Scorer::new(&plan.weights, &profile.favorite_tags).score_all(candidates);
        let candidate_count = scored.len();
        let limit = self.settings.resolve_limit(query.limit);
        let ranked = ranker::rank(scored, limit);

        tracing::info!(
            tag_terms = ?plan.tag_terms,
            cast_terms = ?plan.cast_terms,
            candidates = candidate_count,
            returned = ranked.len(),
            "Computed recommendations"
        );

        ranked
    }
}
