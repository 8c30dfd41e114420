use std::collections::HashMap;

use tokio::sync::RwLock;

use surfacefit_core::domain::product::{ProductDetail, ProductId, ProductSummary};

use super::{CatalogRepository, RepositoryError};

/// Catalog kept in process memory. Search ordering mirrors the SQL store,
/// including unnamed products sorting first.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    products: RwLock<HashMap<String, ProductDetail>>,
}

impl InMemoryCatalogRepository {
    pub fn with_products(details: impl IntoIterator<Item = ProductDetail>) -> Self {
        let products =
            details.into_iter().map(|detail| (detail.id().as_str().to_string(), detail)).collect();
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let needle = query.trim().to_lowercase();
        let products = self.products.read().await;

        let mut hits: Vec<&ProductSummary> = products
            .values()
            .map(|detail| &detail.product)
            .filter(|product| {
                let name = product.name.as_deref().unwrap_or_default().to_lowercase();
                name.contains(&needle) || product.id.as_str().to_lowercase().contains(&needle)
            })
            .collect();
        hits.sort_by(|left, right| (&left.name, &left.id).cmp(&(&right.name, &right.id)));

        Ok(hits.into_iter().take(limit).cloned().collect())
    }

    async fn find_detail(&self, id: &ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(id.as_str()).cloned())
    }

    async fn list_ids(&self) -> Result<Vec<ProductId>, RepositoryError> {
        let products = self.products.read().await;
        let mut ids: Vec<ProductId> = products.values().map(|detail| detail.id().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn save(&self, detail: ProductDetail) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.insert(detail.id().as_str().to_string(), detail);
        Ok(())
    }
}
