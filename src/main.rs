use rusty_library_catalog::{
    adapters::{memory::InMemoryCatalogStore, postgres::PostgresCatalogStore},
    api::{handlers::AppState, router::create_router},
    application::catalog::CatalogDependencies,
    config::{AppConfig, StorageBackend},
    ports::CatalogStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rusty_library_catalog=debug,tower_http=debug,axum=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Initialize catalog store
    let catalog_store: Arc<dyn CatalogStore> = match config.storage {
        StorageBackend::Postgres => {
            tracing::info!("Database URL: {}", config.database_url);

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await
                .expect("Failed to connect to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            Arc::new(PostgresCatalogStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory catalog store; data is lost on shutdown");
            Arc::new(InMemoryCatalogStore::new())
        }
    };

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps: CatalogDependencies { catalog_store },
    });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

/// Resolves when Ctrl-C is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
