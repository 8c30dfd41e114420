use std::path::PathBuf;
use std::sync::Arc;

use surfacefit_agent::{AgentRuntime, LazyEmbeddingIndex, OllamaClient};
use surfacefit_core::config::{AppConfig, ConfigError, LoadOptions};
use surfacefit_db::{connect_with_config, migrations, DbPool, SqlCatalogRepository};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub agent_runtime: Arc<AgentRuntime>,
    pub index_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client setup failed: {0:#}")]
    LlmClient(#[source] anyhow::Error),
}

#[cfg(test)]
pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    bootstrap_with_config(AppConfig::load(options)?).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let llm = Arc::new(OllamaClient::from_config(&config.llm).map_err(BootstrapError::LlmClient)?);
    let index_path = config.index.path.clone();
    let index = LazyEmbeddingIndex::new(index_path.clone(), llm.clone());
    let agent_runtime = AgentRuntime::new(
        llm,
        Arc::new(SqlCatalogRepository::new(db_pool.clone())),
        Arc::new(index),
        config.agent.clone(),
    );

    Ok(Application { config, db_pool, agent_runtime: Arc::new(agent_runtime), index_path })
}
