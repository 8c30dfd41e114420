use std::collections::HashSet;

use serde::Deserialize;

use surfacefit_core::domain::product::ProductId;
use surfacefit_core::domain::usage::UseCase;
use surfacefit_core::suitability::evaluate;
use surfacefit_db::{
    connect_with_settings, migrations, CatalogRepository, DemoCatalog, SqlCatalogRepository,
};

type SeedContractTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
    ($left:expr, $right:expr, $($arg:tt)*) => {
        if $left != $right {
            return Err(format!($($arg)*));
        }
    };
}

#[derive(Debug, Deserialize)]
struct ExpectedVerdict {
    use_case: String,
    ok: Option<bool>,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct SeedProductContract {
    id: String,
    name: String,
    attribute_keys: Vec<String>,
    expected_verdicts: Vec<ExpectedVerdict>,
}

#[derive(Debug, Deserialize)]
struct SeedContract {
    dataset_version: String,
    seed_dataset: String,
    products: Vec<SeedProductContract>,
}

fn load_contract() -> SeedContractTestResult<SeedContract> {
    serde_json::from_str(include_str!("../../../config/fixtures/demo_catalog_contract.json"))
        .map_err(|error| format!("seed contract JSON must parse: {error}"))
}

#[test]
fn seed_contract_matches_demo_catalog_sql_fixture() -> SeedContractTestResult {
    let fixture_sql = DemoCatalog::SQL;
    let contract = load_contract()?;
    let mut ids_seen = HashSet::new();

    require_eq!(contract.dataset_version, "demo-catalog-v1");
    require_eq!(contract.seed_dataset, "deterministic_surface_catalog");
    require_eq!(contract.products.len(), DemoCatalog::product_ids().count());

    for product in &contract.products {
        require!(ids_seen.insert(product.id.clone()), "duplicate product id: {}", product.id);
        require!(
            DemoCatalog::product_ids().any(|id| id == product.id),
            "contract product {} is not part of the demo catalog",
            product.id
        );
        require!(
            fixture_sql.contains(&format!("('{}', '{}'", product.id, product.name)),
            "seed SQL fixture should insert product {} named {}",
            product.id,
            product.name
        );
        for key in &product.attribute_keys {
            require!(
                fixture_sql.contains(&format!("('{}', '{}'", product.id, key)),
                "seed SQL fixture should include attribute {} for {}",
                key,
                product.id
            );
        }
        require!(!product.expected_verdicts.is_empty());
        for verdict in &product.expected_verdicts {
            require!(
                verdict.use_case.parse::<UseCase>().is_ok(),
                "unknown use case {} for {}",
                verdict.use_case,
                product.id
            );
        }
    }

    Ok(())
}

#[tokio::test]
async fn seeded_catalog_produces_contract_verdicts() -> SeedContractTestResult {
    let contract = load_contract()?;
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate: {error}"))?;
    DemoCatalog::load(&pool).await.map_err(|error| format!("seed: {error}"))?;
    let repo = SqlCatalogRepository::new(pool.clone());

    for product in &contract.products {
        let detail = repo
            .find_detail(&ProductId::new(product.id.as_str()))
            .await
            .map_err(|error| format!("find {}: {error}", product.id))?
            .ok_or_else(|| format!("product {} should be seeded", product.id))?;

        for expected in &product.expected_verdicts {
            let use_case: UseCase =
                expected.use_case.parse().map_err(|error| format!("{error}"))?;
            let verdict = evaluate(&detail, use_case);

            require_eq!(
                verdict.ok,
                expected.ok,
                "{} / {}: expected ok={:?}, got {:?} ({})",
                product.id,
                use_case,
                expected.ok,
                verdict.ok,
                verdict.reason
            );
            require!(
                (verdict.confidence - expected.confidence).abs() < 1e-9,
                "{} / {}: expected confidence {}, got {}",
                product.id,
                use_case,
                expected.confidence,
                verdict.confidence
            );
        }
    }

    pool.close().await;
    Ok(())
}
