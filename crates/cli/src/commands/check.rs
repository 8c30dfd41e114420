use surfacefit_agent::tools::check_usage;
use surfacefit_core::domain::product::ProductId;
use surfacefit_core::domain::usage::UseCase;
use surfacefit_core::errors::ApplicationError;
use surfacefit_db::SqlCatalogRepository;

use crate::commands::{
    open_database, run_async, CommandFailure, CommandResult, EXIT_CONFIG, EXIT_DATABASE,
    EXIT_NOT_FOUND,
};

pub fn run(product_id: &str, use_case: &str) -> CommandResult {
    let use_case = match use_case.parse::<UseCase>() {
        Ok(use_case) => use_case,
        Err(error) => {
            return CommandResult::failure(
                "check",
                "invalid_argument",
                error.to_string(),
                EXIT_CONFIG,
            );
        }
    };
    let product_id = ProductId::new(product_id);

    run_async("check", |config| async move {
        let pool = open_database(&config).await?;
        let catalog = SqlCatalogRepository::new(pool.clone());
        let checked = check_usage(&catalog, &product_id, use_case).await;
        pool.close().await;

        let (detail, verdict) = checked.map_err(|error| match error {
            ApplicationError::ProductNotFound(_) => {
                ("not_found", error.to_string(), EXIT_NOT_FOUND)
            }
            other => ("catalog_read", other.to_string(), EXIT_DATABASE),
        })?;

        let answer = match verdict.ok {
            Some(true) => "suitable",
            Some(false) => "not suitable",
            None => "inconclusive",
        };
        let message = format!(
            "{} ({}) for {}: {answer}. {}",
            detail.product.name.as_deref().unwrap_or("Unnamed"),
            verdict.product_id,
            verdict.use_case,
            verdict.reason
        );
        let data = serde_json::to_value(&verdict)
            .map_err(|error| ("serialization", error.to_string(), EXIT_DATABASE))?;
        Ok::<_, CommandFailure>(CommandResult::success_with_data("check", message, Some(data)))
    })
}
