//! Start the GTMS server.

use clap::Args;

use gtms_core::config::AppConfig;
use gtms_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Skip applying migrations on startup
    #[arg(long)]
    pub no_migrate: bool,

    /// Do not start the cron scheduler
    #[arg(long)]
    pub no_scheduler: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.no_scheduler {
        config.scheduler.enabled = false;
    }

    println!("Starting GTMS server...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);

    let db = super::connect(&config).await?;

    if !args.no_migrate {
        println!("Running database migrations...");
        gtms_database::migration::run_migrations(db.pool()).await?;
        println!("  Migrations applied successfully.");
    }

    gtms_api::run_server(config, db).await
}
