use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    models::{Item, ItemId},
    services::catalog::{CatalogGateway, Term},
};

/// Deduplicated candidates keyed by id, in canonical insertion order
///
/// The first insert of an id wins; later inserts of the same id are ignored.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the id was already present
    pub fn insert(&mut self, item: Item) -> bool {
        if self.index.contains_key(&item.id) {
            return false;
        }
        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        true
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

/// Fans term queries out to the catalog and merges the results
pub struct Aggregator {
    gateway: Arc<dyn CatalogGateway>,
}

impl Aggregator {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        Self { gateway }
    }

    /// Queries every term concurrently and merges the answers
    ///
    /// Results are merged in `terms` order, each term's list in the order the
    /// gateway returned it, regardless of which fetch finished first. A failing
    /// term contributes nothing. Ids in `excluded` never enter the set.
    pub async fn collect(&self, terms: &[Term], excluded: &HashSet<ItemId>) -> CandidateSet {
        let mut tasks = Vec::new();

        for term in terms {
            let gateway = Arc::clone(&self.gateway);
            let term = term.clone();
            let task = tokio::spawn(async move { term.fetch(gateway.as_ref()).await });
            tasks.push(task);
        }

        let mut candidates = CandidateSet::new();
        let mut failures = 0usize;

        for (term, task) in terms.iter().zip(tasks) {
            let items = match task.await {
                Ok(Ok(items)) => items,
                Ok(Err(e)) => {
                    tracing::warn!(term = %term, error = %e, "Catalog query failed, skipping term");
                    failures += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(term = %term, error = %e, "Catalog task join error");
                    failures += 1;
                    continue;
                }
            };

            let returned = items.len();
            let mut added = 0usize;
            for item in items {
                if excluded.contains(&item.id) {
                    continue;
                }
                if candidates.insert(item) {
                    added += 1;
                }
            }

            tracing::debug!(term = %term, returned, added, "Merged catalog results");
        }

        if failures > 0 {
            tracing::warn!(
                success_count = terms.len() - failures,
                error_count = failures,
                gateway = self.gateway.name(),
                "Partial catalog fetch failure"
            );
        }

        candidates
    }
}
