use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sui_marketplace_indexer::api::{self, AppState};
use sui_marketplace_indexer::chain::RpcEventSource;
use sui_marketplace_indexer::config::Config;
use sui_marketplace_indexer::db::init_database;
use sui_marketplace_indexer::store::{MarketplaceStore, PgStore};
use sui_marketplace_indexer::worker::IndexerWorker;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,sui_marketplace_indexer=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::init()?;
    info!("Initialized configuration");

    if config.indexer.secret.is_none() {
        warn!("INDEXER_SECRET is not set; sync requests will be rejected");
    }

    // Initialize database
    let db = Arc::new(init_database(&config.database).await?);
    info!("Connected to database");

    // Wire the synchronizer to the chain source and the store
    let source = Arc::new(RpcEventSource::new(&config.chain)?);
    info!(
        "Tracking events of {}::{} via {}",
        config.chain.package_id, config.chain.module_name, config.chain.rpc_url
    );

    let store: Arc<dyn MarketplaceStore> = Arc::new(PgStore::new(db.clone()));
    let worker = Arc::new(IndexerWorker::new(
        source,
        store.clone(),
        config.indexer.page_size,
    ));

    // Serve until shutdown
    api::start_api_server(AppState { db, store, worker }).await?;

    info!("Marketplace indexer shutdown complete");
    Ok(())
}
