//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every section has defaults so a bare environment still
//! produces a usable configuration.

pub mod app;
pub mod auth;
pub mod database;
pub mod location;
pub mod logging;
pub mod notification;
pub mod push;
pub mod scheduler;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig, SoundsConfig};
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::location::{LocationConfig, RefirePolicy};
pub use self::logging::LoggingConfig;
pub use self::notification::{Locale, NotificationsConfig};
pub use self::push::PushConfig;
pub use self::scheduler::SchedulerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// (default.toml + environment overlay + `GTMS__` variables). Built once
/// at startup and shared read-only behind an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Bearer token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Web Push delivery settings.
    #[serde(default)]
    pub push: PushConfig,
    /// Notification listing and labelling settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Scheduled check settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Location trigger settings.
    #[serde(default)]
    pub location: LocationConfig,
    /// Notification sound assets.
    #[serde(default)]
    pub sounds: SoundsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with `config/{env}.toml` and
    /// environment variables prefixed with `GTMS__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from a specific directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GTMS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
