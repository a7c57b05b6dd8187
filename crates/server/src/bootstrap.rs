use std::sync::Arc;

use orderly_agent::llm::{self, LlmClient};
use orderly_core::config::AppConfig;
use orderly_core::store::OrderStore;
use orderly_db::{connect_with_settings, migrations, DbPool, DemoSeedDataset, SqlOrderStore};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub store: Arc<dyn OrderStore>,
    pub llm: Arc<dyn LlmClient>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("demo fixture load failed: {0}")]
    Seed(#[source] sqlx::Error),
    #[error("generative client initialization failed: {0}")]
    Llm(#[source] anyhow::Error),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    // First-run behavior: an empty database is seeded with the demo
    // dataset so the chat surface has something to answer about.
    if DemoSeedDataset::is_database_empty(&db_pool).await.map_err(BootstrapError::Seed)? {
        DemoSeedDataset::load(&db_pool).await.map_err(BootstrapError::Seed)?;
        info!(
            event_name = "system.bootstrap.demo_data_seeded",
            "empty database seeded with demo fixtures"
        );
    }

    let llm = llm::client_from_config(&config.llm).map_err(BootstrapError::Llm)?;
    info!(
        event_name = "system.bootstrap.generative_mode",
        mode = if config.has_generative_credentials() { "http" } else { "static" },
        "generative responder initialized"
    );

    let store: Arc<dyn OrderStore> = Arc::new(SqlOrderStore::new(db_pool.clone()));

    Ok(Application { config, db_pool, store, llm })
}
