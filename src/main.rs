use std::sync::Arc;

use docrepo::config::{self, Config};
use docrepo::documents::{CollectionRepository, FirestoreBackend};
use docrepo::DataRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing before loading configuration
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config::log_filter(&config::log_level()).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;
    config.validate().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    tracing::info!("Environment: {}", config.app.env);
    tracing::info!(
        "Firestore project '{}' at {}",
        config.firestore.project_id,
        config.firestore.base_url
    );

    let backend = Arc::new(FirestoreBackend::from_config(&config.firestore)?);
    let users = CollectionRepository::with_collection(backend, &config.app.default_collection)?;

    // Get every document in the collection
    let documents = users.get(&[], &[], None).await?;

    println!(
        "All {} ({}):\n{}",
        config.app.default_collection,
        documents.len(),
        serde_json::to_string_pretty(&documents)?
    );

    Ok(())
}
