use surfacefit_db::{DemoCatalog, ProductSeedInfo, VerificationResult};

use crate::commands::{
    open_database, run_async, CommandFailure, CommandResult, EXIT_MIGRATION, EXIT_VERIFICATION,
};

pub fn run() -> CommandResult {
    run_async("seed", |config| async move {
        let pool = open_database(&config).await?;

        let outcome = async {
            let seed_result = DemoCatalog::load(&pool)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;
            let verification = DemoCatalog::verify(&pool)
                .await
                .map_err(|error| ("seed_verification", error.to_string(), EXIT_VERIFICATION))?;

            if !verification.all_present {
                let message = verification_message(&verification);
                return Err(("seed_verification", message, EXIT_VERIFICATION));
            }
            let message = seed_message(&seed_result.products_seeded);
            Ok::<_, CommandFailure>(CommandResult::success("seed", message))
        }
        .await;

        pool.close().await;
        outcome
    })
}

fn seed_message(products: &[ProductSeedInfo]) -> String {
    let lines: Vec<String> = products
        .iter()
        .map(|product| format!("  - {}: {} ({})", product.id, product.name, product.description))
        .collect();
    format!("demo catalog loaded with {} products:\n{}", products.len(), lines.join("\n"))
}

fn verification_message(verification: &VerificationResult) -> String {
    let failed_checks = verification
        .checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}
