use sqlx::{sqlite::SqliteRow, Row};

use surfacefit_core::domain::product::{
    AttributeRecord, ProductDetail, ProductDocument, ProductId, ProductSummary, RelatedItem,
};

use super::{CatalogRepository, RepositoryError};
use crate::DbPool;

const SUMMARY_COLUMNS: &str = "id, name, url, category, price_per_sqft, price_per_box,
    size_primary, color, finish, store_id, last_scraped_at";

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(&format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM products
             WHERE instr(LOWER(IFNULL(name, '')), LOWER(?1)) > 0
                OR instr(LOWER(id), LOWER(?1)) > 0
             ORDER BY name ASC, id ASC
             LIMIT ?2"
        ))
        .bind(query.trim())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(summary_from_row).collect()
    }

    async fn find_detail(&self, id: &ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {SUMMARY_COLUMNS} FROM products WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut detail = ProductDetail::new(summary_from_row(&row)?);

        detail.attributes = sqlx::query(
            "SELECT key, value FROM product_attributes WHERE product_id = ? ORDER BY id ASC",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| -> Result<AttributeRecord, RepositoryError> {
            Ok(AttributeRecord { key: row.try_get("key")?, value: row.try_get("value")? })
        })
        .collect::<Result<_, _>>()?;

        detail.documents = sqlx::query(
            "SELECT label, url FROM product_documents WHERE product_id = ? ORDER BY id ASC",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| -> Result<ProductDocument, RepositoryError> {
            Ok(ProductDocument { label: row.try_get("label")?, url: row.try_get("url")? })
        })
        .collect::<Result<_, _>>()?;

        detail.related_items = sqlx::query(
            "SELECT name, url, related_id
             FROM product_related_items
             WHERE product_id = ?
             ORDER BY id ASC",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| -> Result<RelatedItem, RepositoryError> {
            Ok(RelatedItem {
                name: row.try_get("name")?,
                url: row.try_get("url")?,
                related_id: row.try_get::<Option<String>, _>("related_id")?.map(ProductId),
            })
        })
        .collect::<Result<_, _>>()?;

        Ok(Some(detail))
    }

    async fn list_ids(&self) -> Result<Vec<ProductId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, String>("SELECT id FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().map(ProductId).collect())
    }

    async fn save(&self, detail: ProductDetail) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let product = &detail.product;

        sqlx::query(
            "INSERT INTO products (
                id,
                name,
                url,
                category,
                price_per_sqft,
                price_per_box,
                size_primary,
                color,
                finish,
                store_id,
                last_scraped_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                url = excluded.url,
                category = excluded.category,
                price_per_sqft = excluded.price_per_sqft,
                price_per_box = excluded.price_per_box,
                size_primary = excluded.size_primary,
                color = excluded.color,
                finish = excluded.finish,
                store_id = excluded.store_id,
                last_scraped_at = excluded.last_scraped_at",
        )
        .bind(product.id.as_str())
        .bind(product.name.as_deref())
        .bind(product.url.as_deref())
        .bind(product.category.as_deref())
        .bind(product.price_per_sqft.as_deref())
        .bind(product.price_per_box.as_deref())
        .bind(product.size_primary.as_deref())
        .bind(product.color.as_deref())
        .bind(product.finish.as_deref())
        .bind(product.store_id)
        .bind(product.last_scraped_at.as_deref())
        .execute(&mut *tx)
        .await?;

        for table in ["product_attributes", "product_documents", "product_related_items"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE product_id = ?"))
                .bind(product.id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        for attribute in &detail.attributes {
            sqlx::query("INSERT INTO product_attributes (product_id, key, value) VALUES (?, ?, ?)")
                .bind(product.id.as_str())
                .bind(&attribute.key)
                .bind(&attribute.value)
                .execute(&mut *tx)
                .await?;
        }

        for document in &detail.documents {
            sqlx::query("INSERT INTO product_documents (product_id, label, url) VALUES (?, ?, ?)")
                .bind(product.id.as_str())
                .bind(&document.label)
                .bind(&document.url)
                .execute(&mut *tx)
                .await?;
        }

        for item in &detail.related_items {
            sqlx::query(
                "INSERT INTO product_related_items (product_id, name, url, related_id)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(product.id.as_str())
            .bind(&item.name)
            .bind(&item.url)
            .bind(item.related_id.as_ref().map(ProductId::as_str))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn summary_from_row(row: &SqliteRow) -> Result<ProductSummary, RepositoryError> {
    Ok(ProductSummary {
        id: ProductId(row.try_get("id")?),
        name: row.try_get("name")?,
        url: row.try_get("url")?,
        category: row.try_get("category")?,
        price_per_sqft: row.try_get("price_per_sqft")?,
        price_per_box: row.try_get("price_per_box")?,
        size_primary: row.try_get("size_primary")?,
        color: row.try_get("color")?,
        finish: row.try_get("finish")?,
        store_id: row.try_get("store_id")?,
        last_scraped_at: row.try_get("last_scraped_at")?,
    })
}
