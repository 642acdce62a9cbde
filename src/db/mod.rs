pub mod memory;
pub mod redis;

use std::fmt::Display;

use crate::error::AppResult;

pub use memory::MemoryStore;
pub use self::redis::{create_redis_client, RedisStore};

/// Keys under which durable state is addressed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The whole preference profile of one user/session
    Preferences(String),
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::Preferences(session) => write!(f, "prefs:{}", session),
        }
    }
}

/// Durable string key-value persistence
///
/// `put` replaces the stored value as a whole; there are no partial updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &StoreKey) -> AppResult<Option<String>>;

    async fn put(&self, key: &StoreKey, value: String) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
