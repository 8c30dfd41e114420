use async_trait::async_trait;
use thiserror::Error;

use surfacefit_core::domain::product::{ProductDetail, ProductId, ProductSummary};

pub mod memory;
pub mod product;

pub use memory::InMemoryCatalogRepository;
pub use product::SqlCatalogRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read and write access to the product catalog.
///
/// `search` is a case-insensitive substring match on product name or id,
/// ordered by name then id. `find_detail` assembles the summary with its
/// attributes in insertion order, documents and related items.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, RepositoryError>;

    async fn find_detail(&self, id: &ProductId) -> Result<Option<ProductDetail>, RepositoryError>;

    async fn list_ids(&self) -> Result<Vec<ProductId>, RepositoryError>;

    /// Replaces the product row and all of its child rows.
    async fn save(&self, detail: ProductDetail) -> Result<(), RepositoryError>;
}
