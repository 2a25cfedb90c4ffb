//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so an empty environment
//! still produces a bootable configuration.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AuthConfig, BootstrapUserConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Legacy variable naming the upload directory.
const UPLOAD_DIRECTORY_ENV: &str = "UPLOAD_DIRECTORY";
/// Legacy variable naming the maximum file size in bytes.
const MAX_FILE_SIZE_ENV: &str = "MAX_FILE_SIZE";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Caller identity settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay,
    /// environment variables prefixed with `CLOUDVAULT__`, and finally the
    /// plain `UPLOAD_DIRECTORY` / `MAX_FILE_SIZE` variables.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CLOUDVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("storage.upload_dir", std::env::var(UPLOAD_DIRECTORY_ENV).ok())?
            .set_override_option(
                "storage.max_file_size_bytes",
                std::env::var(MAX_FILE_SIZE_ENV).ok(),
            )?
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that cannot work at runtime.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.storage.max_file_size_bytes == 0 {
            return Err(AppError::configuration(
                "storage.max_file_size_bytes must be greater than zero",
            ));
        }
        if self.storage.max_page_size == 0 {
            return Err(AppError::configuration(
                "storage.max_page_size must be greater than zero",
            ));
        }
        if self.auth.user_header.trim().is_empty() {
            return Err(AppError::configuration("auth.user_header must not be empty"));
        }
        Ok(())
    }
}
