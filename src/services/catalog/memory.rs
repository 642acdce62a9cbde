/// In-process catalog backend
///
/// Answers tag and cast lookups by scanning a fixed item list in insertion
/// order. Used for local runs (loaded from a JSON fixture) and in tests, where
/// individual terms can be marked unavailable to simulate backend failures.
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::Item,
    services::catalog::{http::normalize_documents, CatalogGateway},
};

#[derive(Default)]
pub struct MemoryCatalog {
    items: Vec<Item>,
    unavailable: HashSet<String>,
    calls: AtomicUsize,
}

impl MemoryCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Loads a catalog from a JSON array of item documents
    pub async fn from_json_file(path: &str) -> AppResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read catalog fixture: {}", e)))?;
        let documents: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|e| AppError::Validation(format!("Catalog fixture is not a JSON array: {}", e)))?;

        let items = normalize_documents(&documents);
        tracing::info!(path = %path, items = items.len(), "Loaded catalog fixture");

        Ok(Self::new(items))
    }

    /// Makes every lookup for `term` fail
    pub fn with_unavailable_term(mut self, term: impl Into<String>) -> Self {
        self.unavailable.insert(term.into());
        self
    }

    /// Number of lookups served so far, failed ones included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, term: &str, matches: impl Fn(&Item) -> bool) -> AppResult<Vec<Item>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.contains(term) {
            return Err(AppError::catalog(term, "marked unavailable"));
        }

        Ok(self.items.iter().filter(|i| matches(*i)).cloned().collect())
    }
}

#[async_trait::async_trait]
impl CatalogGateway for MemoryCatalog {
    async fn fetch_by_tag(&self, tag: &str) -> AppResult<Vec<Item>> {
        self.lookup(tag, |item| item.has_tag(tag))
    }

    async fn fetch_by_cast(&self, member: &str) -> AppResult<Vec<Item>> {
        self.lookup(member, |item| item.has_cast(member))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![
            Item::new("P2", ["healing", "daily"], Vec::<String>::new()),
            Item::new("P3", ["daily"], Vec::<String>::new()),
            Item::new("P4", Vec::<String>::new(), ["A"]),
        ])
    }

    #[tokio::test]
    async fn test_fetch_by_tag_preserves_insertion_order() {
        let items = catalog().fetch_by_tag("daily").await.unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["P2", "P3"]);
    }

    #[tokio::test]
    async fn test_fetch_by_cast() {
        let items = catalog().fetch_by_cast("A").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "P4");
        assert!(catalog().fetch_by_cast("Z").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_term_fails_and_counts() {
        let catalog = catalog().with_unavailable_term("daily");
        tokio_test::assert_err!(catalog.fetch_by_tag("daily").await);
        tokio_test::assert_ok!(catalog.fetch_by_tag("healing").await);
        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_fixture_file() {
        let result = MemoryCatalog::from_json_file("/nonexistent/catalog.json").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_loads_demo_fixture() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/catalog.json");
        let catalog = tokio_test::assert_ok!(MemoryCatalog::from_json_file(path).await);

        // The document without an id is dropped; the numeric `_id` becomes a string
        let ids: Vec<&str> = catalog.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3", "P4", "5"]);

        let healing = catalog.fetch_by_tag("healing").await.unwrap();
        let healing_ids: Vec<&str> = healing.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(healing_ids, vec!["P2", "5"]);

        let b = catalog.fetch_by_cast("B").await.unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(b[1].title.as_deref(), Some("Lantern Festival"));
    }
}
