//! GTMS server: glaucoma treatment notification core.
//!
//! Loads configuration, prepares the database and hands over to the API
//! crate, which runs the HTTP surface and the check scheduler.

use tracing_subscriber::{EnvFilter, fmt};

use gtms_core::config::AppConfig;
use gtms_core::error::AppError;
use gtms_database::DatabasePool;

#[tokio::main]
async fn main() {
    let env = std::env::var("GTMS_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting GTMS v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    if config.database.migrate_on_start {
        gtms_database::migration::run_migrations(db.pool()).await?;
    } else {
        tracing::info!("Skipping migrations (migrate_on_start = false)");
    }

    gtms_api::run_server(config, db).await
}
