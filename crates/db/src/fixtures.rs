use serde::Serialize;
use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Expected shape of each demo product after seeding.
struct SeedProductContract {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    attribute_count: i64,
    attributes_label: &'static str,
    description: &'static str,
}

const SEED_PRODUCTS: &[SeedProductContract] = &[
    SeedProductContract {
        id: "100001",
        attributes_label: "100001 attributes",
        name: "Calacatta Gold Porcelain Tile",
        category: "porcelain-tile",
        attribute_count: 13,
        description: "Indoor/outdoor porcelain rated for wet floors",
    },
    SeedProductContract {
        id: "100002",
        attributes_label: "100002 attributes",
        name: "Arctic White Ceramic Subway Tile",
        category: "ceramic-tile",
        attribute_count: 8,
        description: "Wall-only ceramic with a porous body",
    },
    SeedProductContract {
        id: "100003",
        attributes_label: "100003 attributes",
        name: "Carrara Polished Marble Tile",
        category: "natural-stone",
        attribute_count: 10,
        description: "Polished marble below the wet-floor DCOF minimum",
    },
    SeedProductContract {
        id: "100004",
        attributes_label: "100004 attributes",
        name: "Hickory Engineered Hardwood",
        category: "wood",
        attribute_count: 8,
        description: "Indoor-only hardwood, not water resistant",
    },
    SeedProductContract {
        id: "100005",
        attributes_label: "100005 attributes",
        name: "Tumbled Travertine Paver",
        category: "pavers",
        attribute_count: 6,
        description: "Thick frost-resistant outdoor paver",
    },
    SeedProductContract {
        id: "100006",
        attributes_label: "100006 attributes",
        name: "Ocean Blue Glass Mosaic",
        category: "mosaic-tile",
        attribute_count: 6,
        description: "Impervious glass mosaic listed for pools",
    },
];

const EXPECTED_DOCUMENTS: i64 = 3;
const EXPECTED_RELATED_ITEMS: i64 = 3;

/// Demo catalog used by `surfacefit seed` and integration tests.
pub struct DemoCatalog;

impl DemoCatalog {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_catalog.sql");

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let products_seeded = SEED_PRODUCTS
            .iter()
            .map(|product| ProductSeedInfo {
                id: product.id,
                name: product.name,
                description: product.description,
            })
            .collect();

        Ok(SeedResult { products_seeded })
    }

    pub fn product_ids() -> impl Iterator<Item = &'static str> {
        SEED_PRODUCTS.iter().map(|product| product.id)
    }

    /// Checks every seeded row against the contract above.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for product in SEED_PRODUCTS {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1 AND name = ?2 AND category = ?3)",
            )
            .bind(product.id)
            .bind(product.name)
            .bind(product.category)
            .fetch_one(pool)
            .await?;
            checks.push((product.id, exists == 1));

            let attribute_count: i64 =
                sqlx::query_scalar("SELECT COUNT(1) FROM product_attributes WHERE product_id = ?1")
                    .bind(product.id)
                    .fetch_one(pool)
                    .await?;
            checks.push((product.attributes_label, attribute_count == product.attribute_count));
        }

        let seeded_ids = sql_array_from_ids(&DemoCatalog::product_ids().collect::<Vec<_>>());
        let documents: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM product_documents WHERE product_id IN {seeded_ids}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("documents", documents == EXPECTED_DOCUMENTS));

        let related: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM product_related_items WHERE product_id IN {seeded_ids}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("related-items", related == EXPECTED_RELATED_ITEMS));

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect::<Vec<_>>();
    format!("({})", quoted.join(", "))
}

#[derive(Clone, Debug, Serialize)]
pub struct SeedResult {
    pub products_seeded: Vec<ProductSeedInfo>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductSeedInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use surfacefit_core::domain::product::ProductId;

    use super::DemoCatalog;
    use crate::repositories::{CatalogRepository, SqlCatalogRepository};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn load_is_idempotent_and_verifies() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");

        DemoCatalog::load(&pool).await.expect("first load");
        let result = DemoCatalog::load(&pool).await.expect("second load");
        assert_eq!(result.products_seeded.len(), 6);

        let verification = DemoCatalog::verify(&pool).await.expect("verify");
        let failed: Vec<_> =
            verification.checks.iter().filter(|(_, present)| !present).collect();
        assert!(verification.all_present, "failed checks: {failed:?}");
    }

    #[tokio::test]
    async fn verify_reports_missing_rows_on_empty_database() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");

        let verification = DemoCatalog::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.checks.iter().any(|(label, present)| *label == "100001" && !present));
    }

    #[tokio::test]
    async fn seeded_duplicate_attributes_are_kept() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        DemoCatalog::load(&pool).await.expect("load");

        let repo = SqlCatalogRepository::new(pool.clone());
        let marble = repo
            .find_detail(&ProductId::new("100003"))
            .await
            .expect("find marble")
            .expect("marble is seeded");

        let absorption: Vec<&str> = marble
            .attributes
            .iter()
            .filter(|attribute| attribute.key == "Water Absorption")
            .map(|attribute| attribute.value.as_str())
            .collect();
        assert_eq!(absorption, vec!["Less than 0.5 percent by weight", "0.2%"]);
    }
}
