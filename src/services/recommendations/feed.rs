/// Last-request-wins publication of background recommendation results
///
/// Every profile change issues a fresh `Generation` for its session and
/// recomputes in a background task. A result is published only if its
/// generation is still the newest one issued; anything older is dropped.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::models::{PreferenceProfile, ScoredItem};

use super::{RecommendationEngine, RecommendationQuery};

/// Token identifying one recommendation computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublishedRecommendations {
    pub generation: Generation,
    pub computed_at: DateTime<Utc>,
    pub items: Vec<ScoredItem>,
}

/// Latest published recommendations of a single session
#[derive(Debug, Default)]
pub struct RecommendationFeed {
    issued: AtomicU64,
    latest: RwLock<Option<PublishedRecommendations>>,
}

impl RecommendationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new generation, superseding every earlier one
    pub fn issue(&self) -> Generation {
        Generation(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.issued.load(Ordering::SeqCst) == generation.0
    }

    /// Stores `items` unless `generation` has been superseded
    pub async fn publish(&self, generation: Generation, items: Vec<ScoredItem>) -> bool {
        let mut latest = self.latest.write().await;

        if !self.is_current(generation) {
            tracing::debug!(
                generation = generation.0,
                newest = self.issued.load(Ordering::SeqCst),
                "Discarding stale recommendations"
            );
            return false;
        }

        *latest = Some(PublishedRecommendations {
            generation,
            computed_at: Utc::now(),
            items,
        });
        true
    }

    pub async fn latest(&self) -> Option<PublishedRecommendations> {
        self.latest.read().await.clone()
    }

    /// Recomputes recommendations for `profile` in the background
    ///
    /// The handle resolves to whether the result was published.
    pub fn refresh(
        self: &Arc<Self>,
        engine: Arc<RecommendationEngine>,
        profile: PreferenceProfile,
    ) -> (Generation, JoinHandle<bool>) {
        let generation = self.issue();
        let feed = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let items = engine
                .compute_recommendations(&profile, &RecommendationQuery::default())
                .await;
            feed.publish(generation, items).await
        });

        (generation, handle)
    }
}

/// Sessions tracked before the least recently used feed is dropped
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Feeds untouched for this long are dropped on the next insert
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct FeedEntry {
    feed: Arc<RecommendationFeed>,
    last_used: Instant,
}

/// Per-session feeds
///
/// Session names come straight from request paths, so the map is bounded:
/// idle feeds expire after `idle_ttl` and the least recently used feed is
/// evicted once `max_sessions` is reached. Refreshes already in flight keep
/// their own handle to an evicted feed and simply publish into it.
#[derive(Debug)]
pub struct FeedRegistry {
    feeds: RwLock<HashMap<String, FeedEntry>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl Default for FeedRegistry {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TTL)
    }
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            feeds: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    /// The feed for `session`, created on first use
    pub async fn feed(&self, session: &str) -> Arc<RecommendationFeed> {
        let now = Instant::now();
        let mut feeds = self.feeds.write().await;

        if let Some(entry) = feeds.get_mut(session) {
            entry.last_used = now;
            return Arc::clone(&entry.feed);
        }

        self.make_room(&mut feeds, now);

        let feed = Arc::new(RecommendationFeed::new());
        feeds.insert(
            session.to_string(),
            FeedEntry {
                feed: Arc::clone(&feed),
                last_used: now,
            },
        );
        feed
    }

    pub async fn existing(&self, session: &str) -> Option<Arc<RecommendationFeed>> {
        self.feeds
            .read()
            .await
            .get(session)
            .map(|entry| Arc::clone(&entry.feed))
    }

    /// Forgets the feed of `session`; returns whether one existed
    pub async fn remove(&self, session: &str) -> bool {
        self.feeds.write().await.remove(session).is_some()
    }

    pub async fn len(&self) -> usize {
        self.feeds.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.feeds.read().await.is_empty()
    }

    /// Drops every feed idle for longer than the TTL as of `now`
    fn evict_idle(&self, feeds: &mut HashMap<String, FeedEntry>, now: Instant) -> usize {
        let before = feeds.len();
        feeds.retain(|_, entry| now.saturating_duration_since(entry.last_used) <= self.idle_ttl);
        before - feeds.len()
    }

    fn make_room(&self, feeds: &mut HashMap<String, FeedEntry>, now: Instant) {
        let expired = self.evict_idle(feeds, now);
        if expired > 0 {
            tracing::debug!(expired, "Evicted idle recommendation feeds");
        }

        while feeds.len() >= self.max_sessions {
            let Some(oldest) = feeds
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(session, _)| session.clone())
            else {
                break;
            };
            feeds.remove(&oldest);
            tracing::debug!(session = %oldest, "Evicted least recently used recommendation feed");
        }
    }
}
