use anyhow::Result;
use domain::store::Stores;
use tracing::{info, warn};

use zellador_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);

    info!("Starting Zellador API v{}", env!("CARGO_PKG_VERSION"));

    let stores = if config.uses_database() {
        // Create database pool
        let pool = persistence::db::create_pool(&(&config.database).into()).await?;

        // Run migrations
        info!("Running database migrations...");
        persistence::db::run_migrations(&pool).await?;
        info!("Migrations completed");

        persistence::pg_stores(pool)
    } else {
        warn!("No database URL configured, using in-memory store");
        Stores::in_memory()
    };

    // Build application
    let app = app::create_app(config.clone(), stores)?;

    // Start server
    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
