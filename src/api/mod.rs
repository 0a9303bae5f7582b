mod handlers;
mod routes;

use crate::config::Config;
use crate::db::{Database, DbPool};
use crate::store::MarketplaceStore;
use crate::worker::IndexerWorker;
use anyhow::Result;
use axum::extract::FromRef;
use axum::{
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub store: Arc<dyn MarketplaceStore>,
    pub worker: Arc<IndexerWorker>,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.get_pool().clone()
    }
}

/// Start the API server
pub async fn start_api_server(state: AppState) -> Result<()> {
    let config = Config::get();

    // Set up CORS
    let cors = if config.api.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    // Create router with all routes
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))
        // Indexer trigger and status
        .route(
            "/api/indexer",
            get(handlers::indexer::indexer_status).post(handlers::indexer::trigger_sync),
        )
        // Profile routes
        .route("/api/profiles", get(handlers::profiles::get_profiles))
        .route("/api/profiles/:id", get(handlers::profiles::get_profile))
        .route(
            "/api/profiles/address/:address",
            get(handlers::profiles::get_profile_by_address),
        )
        // Listing routes
        .route("/api/listings", get(handlers::listings::get_listings))
        .route("/api/listings/:id", get(handlers::listings::get_listing))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Get bind address
    let addr = format!("{}:{}", config.api.host, config.api.port).parse::<SocketAddr>()?;

    // Start server
    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received, stopping API server");
    }
}
