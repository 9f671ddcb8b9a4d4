use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod firestore;

pub use firestore::FirestoreConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub firestore: FirestoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub default_collection: String,
}

/// Log level from `LOG_LEVEL`, readable before the rest of the configuration
pub fn log_level() -> String {
    env::var("LOG_LEVEL")
        .ok()
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// Default tracing filter directive for this crate at `level`
pub fn log_filter(level: &str) -> String {
    format!("docrepo={}", level.trim())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: log_level(),
                default_collection: env::var("DEFAULT_COLLECTION")
                    .unwrap_or_else(|_| "users".to_string()),
            },
            firestore: FirestoreConfig::from_env()?,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app.default_collection.trim().is_empty() {
            return Err(AppError::Configuration(
                "DEFAULT_COLLECTION cannot be empty".to_string(),
            ));
        }

        self.firestore.validate()
    }
}
