//! CLI command definitions and dispatch.

pub mod check;
pub mod migrate;
pub mod report;
pub mod serve;

use clap::{Parser, Subcommand};

use gtms_core::config::AppConfig;
use gtms_core::error::AppError;
use gtms_database::DatabasePool;

use crate::output::OutputFormat;

/// GTMS notification core operations
#[derive(Debug, Parser)]
#[command(name = "gtms", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and environment overlays
    #[arg(long, default_value = "config", global = true)]
    pub config_dir: String,

    /// Environment overlay to merge (config/{env}.toml)
    #[arg(short, long, env = "GTMS_ENV", default_value = "development", global = true)]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server and scheduler
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Run one scheduled check immediately
    Check(check::CheckArgs),
    /// Build a compliance report for a patient
    Report(report::ReportArgs),
}

impl Cli {
    /// Whether this invocation starts the server.
    pub fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve(_))
    }

    /// Subcommand name, for error context.
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Commands::Serve(_) => "serve",
            Commands::Migrate(_) => "migrate",
            Commands::Check(_) => "check",
            Commands::Report(_) => "report",
        }
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config_dir, &self.env)?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Check(args) => check::execute(args, &config, self.format).await,
            Commands::Report(args) => report::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: connect to the configured database
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}
