use crate::core::{AppError, Result};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE_ID: &str = "(default)";

// The emulator accepts this token as an admin credential
const EMULATOR_TOKEN: &str = "owner";

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    pub base_url: String,
    pub emulator: bool,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl FirestoreConfig {
    /// Configuration for the production endpoint with default settings
    pub fn new(project_id: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: DEFAULT_DATABASE_ID.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            emulator: false,
            access_token,
            timeout_secs: 30,
            max_retries: 3,
        }
    }

    /// Configuration targeting a local emulator (`host:port`)
    pub fn for_emulator(host: &str, project_id: impl Into<String>) -> Self {
        Self {
            base_url: format!("http://{}", host),
            emulator: true,
            ..Self::new(project_id, None)
        }
    }

    pub fn from_env() -> Result<Self> {
        let project_id = env::var("FIRESTORE_PROJECT_ID")
            .map_err(|_| AppError::Configuration("FIRESTORE_PROJECT_ID not set".to_string()))?;

        let mut config = match env::var("FIRESTORE_EMULATOR_HOST") {
            Ok(host) if !host.trim().is_empty() => Self::for_emulator(host.trim(), project_id),
            _ => Self::new(project_id, None),
        };

        if !config.emulator {
            if let Ok(base_url) = env::var("FIRESTORE_BASE_URL") {
                config.base_url = base_url;
            }
        }

        config.database_id =
            env::var("FIRESTORE_DATABASE_ID").unwrap_or_else(|_| DEFAULT_DATABASE_ID.to_string());
        config.access_token = env::var("FIRESTORE_ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        config.timeout_secs = env::var("FIRESTORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| AppError::Configuration("Invalid FIRESTORE_TIMEOUT_SECS".to_string()))?;
        config.max_retries = env::var("FIRESTORE_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| AppError::Configuration("Invalid FIRESTORE_MAX_RETRIES".to_string()))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(AppError::Configuration(
                "Firestore project id cannot be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "Firestore timeout must be greater than 0".to_string(),
            ));
        }

        if !self.emulator && self.access_token.is_none() {
            return Err(AppError::Configuration(
                "FIRESTORE_ACCESS_TOKEN is required outside the emulator".to_string(),
            ));
        }

        Ok(())
    }

    /// Token sent as `Authorization: Bearer`
    pub fn bearer_token(&self) -> Option<String> {
        match (&self.access_token, self.emulator) {
            (Some(token), _) => Some(token.clone()),
            (None, true) => Some(EMULATOR_TOKEN.to_string()),
            (None, false) => None,
        }
    }

    /// Build the HTTP client with transient-failure retries
    pub fn create_client(&self) -> Result<ClientWithMiddleware> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(self.max_retries);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}
