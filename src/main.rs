//! Store Cache demo
//!
//! Walks through the cache operations against the configured store.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use store_cache::{
    spawn_cleanup_task, Config, MemoryStore, MemoryStoreConfig, SimpleCache, StoreCache,
    StoreClient, Ttl,
};

#[derive(Debug, Serialize, Deserialize)]
struct Visit {
    path: String,
    at: DateTime<Utc>,
}

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the store client (Redis when configured, otherwise in-memory)
/// 4. Run the walk-through on a blocking worker thread
/// 5. For the in-memory store, keep the cleanup task running until Ctrl+C
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "store_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: store={}, max_entries={}, default_ttl={:?}, cleanup_interval={}s",
        config.store_url.as_deref().unwrap_or("memory"),
        config.max_entries,
        config.default_ttl,
        config.cleanup_interval
    );

    if let Some(url) = config.store_url.as_deref() {
        return run_remote(url).await;
    }

    let store = Arc::new(MemoryStore::new(MemoryStoreConfig::from(&config)));
    let cleanup_handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);

    run_blocking(StoreCache::new(store.clone())).await?;
    info!("In-memory store stats: {:?}", store.stats());

    info!("Press Ctrl+C to exit");
    signal::ctrl_c()
        .await
        .context("failed to install Ctrl+C handler")?;

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
    Ok(())
}

#[cfg(feature = "redis")]
async fn run_remote(url: &str) -> anyhow::Result<()> {
    let store = store_cache::store::RedisStore::connect(url)
        .with_context(|| format!("failed to connect to {url}"))?;
    info!("Connected to {}", url);
    run_blocking(StoreCache::new(Arc::new(store))).await
}

#[cfg(not(feature = "redis"))]
async fn run_remote(url: &str) -> anyhow::Result<()> {
    anyhow::bail!("STORE_URL is set to {url}, but this build lacks the `redis` feature")
}

/// The store clients block, so the walk-through runs off the async runtime.
async fn run_blocking<C>(cache: StoreCache<C>) -> anyhow::Result<()>
where
    C: StoreClient + Send + Sync + 'static,
{
    tokio::task::spawn_blocking(move || walk_through(&cache))
        .await
        .context("demo worker panicked")?
}

fn walk_through<C: StoreClient>(cache: &StoreCache<C>) -> anyhow::Result<()> {
    let visit = Visit {
        path: "/index.html".to_string(),
        at: Utc::now(),
    };

    let stored = cache.set("last_visit", &visit, Some("2 hours".parse::<Ttl>()?))?;
    info!("Stored last_visit: {}", stored);

    let cached: Option<Visit> = cache.get("last_visit")?;
    info!("Read last_visit: {:?}", cached);

    let counters = [("hits", 10u64), ("misses", 2u64)];
    let stored = cache.set_multiple(counters, Some(Ttl::Seconds(60)))?;
    info!("Stored counters: {}", stored);

    let values = cache.get_multiple(["hits", "misses", "evictions"], 0u64)?;
    info!("Counters: {:?}", values);

    info!("has(last_visit) = {}", cache.has("last_visit")?);
    info!(
        "delete_multiple(last_visit, unknown) = {}",
        cache.delete_multiple(["last_visit", "unknown"])?
    );
    info!("has(last_visit) = {}", cache.has("last_visit")?);

    match cache.get::<u64>("bad:key") {
        Ok(_) => warn!("Reserved character was accepted"),
        Err(err) if err.is_caller_error() => info!("Rejected key as expected: {}", err),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
