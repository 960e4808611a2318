//! HTTP API server for the catalog and orders service.
//!
//! Provides REST endpoints for products and orders, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use catalog_store::{CatalogStore, PostgresCatalogStore};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::migrate::MigrateDatabase;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CatalogStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health))
        .route(
            "/api/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route(
            "/api/products/{id}",
            get(routes::products::get::<S>).put(routes::products::update::<S>),
        )
        .route(
            "/api/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route(
            "/api/orders/{id}",
            get(routes::orders::get::<S>).delete(routes::orders::delete::<S>),
        )
        .route(
            "/api/orders/{id}/status",
            axum::routing::patch(routes::orders::update_status::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a store handle.
pub fn create_default_state<S: CatalogStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}

/// Connects to PostgreSQL and brings the schema up to date.
///
/// The database named in the URL is created first when it is missing and
/// `config.create_database` is set.
pub async fn connect_postgres(
    config: &Config,
    database_url: &str,
) -> Result<PostgresCatalogStore, catalog_store::StoreError> {
    if config.create_database && !sqlx::Postgres::database_exists(database_url).await? {
        tracing::info!("database missing, creating it");
        sqlx::Postgres::create_database(database_url).await?;
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await?;

    let store = PostgresCatalogStore::new(pool);
    store.run_migrations().await?;
    Ok(store)
}
