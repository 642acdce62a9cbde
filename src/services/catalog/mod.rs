/// Catalog backend abstraction
///
/// The recommendation engine only ever asks the catalog two questions: which
/// items carry a given tag, and which items feature a given cast member.
/// Implementations normalize raw documents into `Item` before returning them.
use std::fmt::Display;

use crate::{error::AppResult, models::Item};

pub mod http;
pub mod memory;

pub use http::HttpCatalog;
pub use memory::MemoryCatalog;

/// Trait for catalog backends
///
/// Both lookups are idempotent and side-effect free. They may return an empty
/// list and may fail transiently; callers decide how to isolate failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Items having tag `tag`, in the backend's own order
    async fn fetch_by_tag(&self, tag: &str) -> AppResult<Vec<Item>>;

    /// Items featuring cast member `member`, in the backend's own order
    async fn fetch_by_cast(&self, member: &str) -> AppResult<Vec<Item>>;

    /// Gateway name for logging and debugging
    fn name(&self) -> &'static str;
}

/// A single catalog query term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Tag(String),
    Cast(String),
}

impl Term {
    pub fn value(&self) -> &str {
        match self {
            Term::Tag(v) | Term::Cast(v) => v,
        }
    }

    /// Resolves this term against `gateway`
    pub async fn fetch(&self, gateway: &dyn CatalogGateway) -> AppResult<Vec<Item>> {
        match self {
            Term::Tag(tag) => gateway.fetch_by_tag(tag).await,
            Term::Cast(member) => gateway.fetch_by_cast(member).await,
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Tag(tag) => write!(f, "tag:{}", tag),
            Term::Cast(member) => write!(f, "cast:{}", member),
        }
    }
}
