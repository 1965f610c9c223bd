//! Driftwatch Server
//!
//! Runs the drift monitor against a PostgreSQL source and exposes its
//! snapshots, thresholds and breaches over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    DRIFTWATCH SERVER                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────────┐   ┌──────────────────┐  │
//! │  │  API      │──▶│  Scheduler  │──▶│  Monitor cycle   │  │
//! │  │  (Axum)   │   │  (tokio)    │   │  (driftwatch-    │  │
//! │  └─────┬─────┘   └─────────────┘   │   core)          │  │
//! │        │                           └───┬──────────┬───┘  │
//! │        ▼                               ▼          ▼      │
//! │  ┌─────────────┐               ┌────────────┐ ┌────────┐ │
//! │  │  Snapshot   │◀──────────────│ PostgreSQL │ │ SQLite │ │
//! │  │  queries    │               │  (source)  │ │ (store)│ │
//! │  └─────────────┘               └────────────┘ └────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod ingest;
mod handlers;
mod error;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use driftwatch_core::{DatasetSource, Monitor, MonitoredDataset, Scheduler, SnapshotStore};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "driftwatch_server=debug,driftwatch_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Driftwatch Server starting...");
    tracing::info!("Source database: {}", config.redacted_database_url());
    tracing::info!(
        "Monitoring {} tables in schema '{}'",
        config.monitor.datasets.len(),
        config.monitor.schema
    );

    let store = SnapshotStore::open(&config.snapshot_db_path).with_context(|| {
        format!("Failed to open snapshot store at {}", config.snapshot_db_path.display())
    })?;

    let pool = db::create_pool(&config.database_url)
        .context("Failed to create database pool")?;

    let monitor = Monitor::new(ingest::PgSource::new(pool), store, config.monitor.clone());
    let scheduler = Arc::new(Scheduler::new(Arc::new(monitor)));

    if config.autostart {
        scheduler.start(config.monitor.interval());
    }

    let app = create_router(AppState::new(scheduler.clone()));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    scheduler.stop().await;
    tracing::info!("Driftwatch Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Shared application state
pub struct AppState<S> {
    pub scheduler: Arc<Scheduler<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S: DatasetSource + 'static> AppState<S> {
    pub fn new(scheduler: Arc<Scheduler<S>>) -> Self {
        Self { scheduler }
    }

    pub fn monitor(&self) -> &Monitor<S> {
        self.scheduler.monitor()
    }

    /// Configured dataset behind a `{schema}.{table}` name
    pub fn resolve(&self, name: &str) -> AppResult<&MonitoredDataset> {
        self.monitor()
            .config()
            .find(name)
            .ok_or_else(|| AppError::NotFound(format!("Dataset '{}' is not monitored", name)))
    }
}

/// Create the main router with all routes
fn create_router<S: DatasetSource + 'static>(state: AppState<S>) -> Router {
    let monitor_routes = Router::new()
        .route("/api/v1/monitor/run", post(handlers::monitor::run::<S>))
        .route("/api/v1/monitor/status", get(handlers::monitor::status::<S>))
        .route("/api/v1/monitor/start", post(handlers::monitor::start::<S>))
        .route("/api/v1/monitor/stop", post(handlers::monitor::stop::<S>));

    let dataset_routes = Router::new()
        .route("/api/v1/datasets", get(handlers::datasets::list::<S>))
        .route("/api/v1/datasets/:name/run", post(handlers::datasets::run::<S>))
        .route("/api/v1/datasets/:name/snapshots/latest", get(handlers::datasets::latest::<S>))
        .route("/api/v1/datasets/:name/thresholds", get(handlers::datasets::thresholds::<S>))
        .route("/api/v1/datasets/:name/breaches", get(handlers::datasets::breaches::<S>));

    Router::new()
        .route("/health", get(handlers::health::check::<S>))
        .merge(monitor_routes)
        .merge(dataset_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
