use serde_json::json;
use surfacefit_agent::{build_index, IndexError, OllamaClient};
use surfacefit_db::SqlCatalogRepository;

use crate::commands::{
    open_database, run_async, CommandFailure, CommandResult, EXIT_INDEX, EXIT_RUNTIME,
};

/// Embeds the catalog through the configured embedding model and writes the
/// index file the chat runtime reads.
pub fn run() -> CommandResult {
    run_async("build-index", |config| async move {
        let pool = open_database(&config).await?;
        let client = OllamaClient::from_config(&config.llm)
            .map_err(|error| ("runtime_init", format!("{error:#}"), EXIT_RUNTIME))?;
        let catalog = SqlCatalogRepository::new(pool.clone());

        let built =
            build_index(&catalog, &client, &config.llm.embedding_model, &config.index.path).await;
        pool.close().await;

        let summary = built
            .map_err(|error| (index_error_class(&error), error.to_string(), EXIT_INDEX))?;
        Ok::<_, CommandFailure>(CommandResult::success_with_data(
            "build-index",
            format!("indexed {} products into {}", summary.entries, summary.path.display()),
            Some(json!({
                "model": summary.model,
                "path": summary.path.display().to_string(),
                "entries": summary.entries,
            })),
        ))
    })
}

fn index_error_class(error: &IndexError) -> &'static str {
    match error {
        IndexError::Embedding(_) => "embedding",
        IndexError::Catalog(_) => "catalog_read",
        _ => "index_build",
    }
}
