use serde::Deserialize;
use std::time::Duration;

use crate::services::recommendations::{feed, EngineSettings, FeedRegistry};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL backing the preference store
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Catalog backend base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Timeout for a single catalog term query
    #[serde(default = "default_catalog_timeout_ms")]
    pub catalog_timeout_ms: u64,

    /// Optional JSON file of catalog items; when set, the catalog is served from memory
    #[serde(default)]
    pub catalog_fixture: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum number of tag terms queried per request
    #[serde(default = "default_max_tag_terms")]
    pub max_tag_terms: usize,

    /// Maximum number of cast terms queried per request
    #[serde(default = "default_max_cast_terms")]
    pub max_cast_terms: usize,

    /// Result size when the caller does not ask for one
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound for caller-supplied limits
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Sessions whose background recommendations are kept at once
    #[serde(default = "default_feed_max_sessions")]
    pub feed_max_sessions: usize,

    /// Seconds a session's background recommendations survive without a mutation
    #[serde(default = "default_feed_idle_ttl_secs")]
    pub feed_idle_ttl_secs: u64,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_catalog_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_catalog_timeout_ms() -> u64 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_tag_terms() -> usize {
    EngineSettings::default().max_tag_terms
}

fn default_max_cast_terms() -> usize {
    EngineSettings::default().max_cast_terms
}

fn default_limit() -> usize {
    EngineSettings::default().default_limit
}

fn default_max_limit() -> usize {
    EngineSettings::default().max_limit
}

fn default_feed_max_sessions() -> usize {
    feed::DEFAULT_MAX_SESSIONS
}

fn default_feed_idle_ttl_secs() -> u64 {
    feed::DEFAULT_IDLE_TTL.as_secs()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Recommendation knobs handed to the engine
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_tag_terms: self.max_tag_terms,
            max_cast_terms: self.max_cast_terms,
            default_limit: self.default_limit.max(1),
            max_limit: self.max_limit.max(1),
        }
    }

    /// Per-session feed registry honoring the configured bounds
    pub fn feed_registry(&self) -> FeedRegistry {
        FeedRegistry::with_limits(
            self.feed_max_sessions,
            Duration::from_secs(self.feed_idle_ttl_secs),
        )
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
