use std::sync::Arc;

use crate::db::{KeyValueStore, MemoryStore};
use crate::models::{Item, PreferenceProfile};
use crate::services::catalog::{CatalogGateway, MemoryCatalog};
use crate::services::preferences::PreferenceStore;
use crate::services::recommendations::{EngineSettings, FeedRegistry, RecommendationEngine};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub preferences: PreferenceStore,
    pub engine: Arc<RecommendationEngine>,
    pub feeds: Arc<FeedRegistry>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn CatalogGateway>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            preferences: PreferenceStore::new(store),
            engine: Arc::new(RecommendationEngine::new(gateway, settings)),
            feeds: Arc::new(FeedRegistry::new()),
        }
    }

    /// Replaces the per-session feed registry, e.g. to apply configured limits
    pub fn with_feeds(mut self, feeds: FeedRegistry) -> Self {
        self.feeds = Arc::new(feeds);
        self
    }

    /// State backed entirely by memory, serving `items` as the catalog
    pub fn in_memory(items: Vec<Item>) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryCatalog::new(items)),
            EngineSettings::default(),
        )
    }

    /// Starts a background recomputation for `session`, superseding any in flight
    pub async fn refresh_recommendations(&self, session: &str, profile: PreferenceProfile) {
        let feed = self.feeds.feed(session).await;
        let (generation, _handle) = feed.refresh(Arc::clone(&self.engine), profile);
        let tracked_sessions = self.feeds.len().await;
        tracing::debug!(
            session = %session,
            generation = generation.value(),
            tracked_sessions,
            "Scheduled recommendation refresh"
        );
    }

    /// Drops the session's feed; a later mutation starts a fresh one
    pub async fn forget_recommendations(&self, session: &str) {
        if self.feeds.remove(session).await {
            tracing::debug!(session = %session, "Dropped recommendation feed");
        }
    }
}
