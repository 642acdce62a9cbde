use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use curio_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, RedisStore},
    services::catalog::{CatalogGateway, HttpCatalog, MemoryCatalog},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let store = Arc::new(RedisStore::new(create_redis_client(&config.redis_url)?));

    let gateway: Arc<dyn CatalogGateway> = match &config.catalog_fixture {
        Some(path) => Arc::new(MemoryCatalog::from_json_file(path).await?),
        None => Arc::new(HttpCatalog::new(
            config.catalog_api_url.clone(),
            Duration::from_millis(config.catalog_timeout_ms),
        )?),
    };

    tracing::info!(
        catalog = gateway.name(),
        settings = ?config.engine_settings(),
        "Recommendation engine configured"
    );

    let state = AppState::new(store, gateway, config.engine_settings())
        .with_feeds(config.feed_registry());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
