//! Embedding-backed product retrieval.
//!
//! The index is a JSON file of pre-normalized product vectors written by
//! `surfacefit build-index`. At query time the query is embedded with the
//! same model and products are ranked by dot product.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use surfacefit_core::domain::product::{ProductDetail, ProductId};
use surfacefit_core::errors::ApplicationError;
use surfacefit_core::suitability::normalize::normalize;
use surfacefit_db::{CatalogRepository, RepositoryError};

use crate::llm::Embedder;

/// Attributes folded into each product's embedding text.
pub const INDEXED_ATTRIBUTES: [&str; 10] = [
    "Bathroom Floor Use",
    "Shower Surface",
    "Shower Wall Use",
    "Placement Location",
    "Water Resistance",
    "Frost Resistance",
    "Radiant Heat Compatible",
    "Installation Options",
    "Installation Type",
    "Material",
];

#[derive(Clone, Debug, PartialEq)]
pub struct SemanticHit {
    pub product_id: ProductId,
    pub score: f32,
}

#[async_trait]
pub trait SemanticIndex: Send + Sync {
    /// Fails with a precondition error when the index cannot be used at all.
    async fn ensure_ready(&self) -> Result<(), ApplicationError> {
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SemanticHit>, ApplicationError>;
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("semantic index not found at {0}; run `surfacefit build-index`")]
    Missing(PathBuf),
    #[error("failed to access semantic index at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("semantic index at {path} is not valid JSON: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("catalog has no products to index")]
    EmptyCatalog,
    #[error(transparent)]
    Catalog(#[from] RepositoryError),
}

impl From<IndexError> for ApplicationError {
    fn from(error: IndexError) -> Self {
        match error {
            IndexError::Missing(_) | IndexError::EmptyCatalog => Self::Precondition(error.to_string()),
            IndexError::Catalog(_) => Self::Persistence(error.to_string()),
            IndexError::Io { .. } | IndexError::Decode { .. } | IndexError::Embedding(_) => {
                Self::Upstream(error.to_string())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: ProductId,
    pub text: String,
    pub vector: Vec<f32>,
}

/// On-disk index layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexFile {
    pub model: String,
    pub entries: Vec<IndexEntry>,
}

impl IndexFile {
    pub async fn read(path: &Path) -> Result<Self, IndexError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::Missing(path.to_path_buf()));
            }
            Err(source) => return Err(IndexError::Io { path: path.to_path_buf(), source }),
        };
        serde_json::from_slice(&bytes)
            .map_err(|source| IndexError::Decode { path: path.to_path_buf(), source })
    }

    pub async fn write(&self, path: &Path) -> Result<(), IndexError> {
        let io_error = |source: std::io::Error| IndexError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let bytes = serde_json::to_vec(self)
            .map_err(|source| IndexError::Decode { path: path.to_path_buf(), source })?;
        tokio::fs::write(path, bytes).await.map_err(io_error)
    }

    /// Ranks entries against an already-normalized query vector.
    pub fn rank(&self, query: &[f32], top_k: usize) -> Vec<SemanticHit> {
        let mut hits: Vec<SemanticHit> = self
            .entries
            .iter()
            .map(|entry| SemanticHit { product_id: entry.id.clone(), score: dot(&entry.vector, query) })
            .collect();
        hits.sort_by(|left, right| right.score.total_cmp(&left.score));
        hits.truncate(top_k);
        hits
    }
}

/// Index loaded on first use and shared read-only afterwards.
pub struct LazyEmbeddingIndex {
    path: PathBuf,
    embedder: Arc<dyn Embedder>,
    loaded: OnceCell<IndexFile>,
}

impl LazyEmbeddingIndex {
    pub fn new(path: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Self {
        Self { path: path.into(), embedder, loaded: OnceCell::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn file(&self) -> Result<&IndexFile, IndexError> {
        self.loaded
            .get_or_try_init(|| async {
                let file = IndexFile::read(&self.path).await?;
                info!(
                    event_name = "semantic_index.loaded",
                    path = %self.path.display(),
                    model = %file.model,
                    entries = file.entries.len(),
                    "semantic index loaded"
                );
                Ok::<_, IndexError>(file)
            })
            .await
    }
}

#[async_trait]
impl SemanticIndex for LazyEmbeddingIndex {
    async fn ensure_ready(&self) -> Result<(), ApplicationError> {
        self.file().await?;
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SemanticHit>, ApplicationError> {
        let file = self.file().await?;
        if query.trim().is_empty() || file.entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|error| IndexError::Embedding(format!("{error:#}")))?;
        normalize_vector(&mut vector);

        let hits = file.rank(&vector, top_k);
        debug!(event_name = "semantic_index.searched", hits = hits.len(), "semantic search executed");
        Ok(hits)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexBuildSummary {
    pub model: String,
    pub path: PathBuf,
    pub entries: usize,
}

/// Embeds every catalog product and writes the index file.
pub async fn build_index(
    catalog: &dyn CatalogRepository,
    embedder: &dyn Embedder,
    model: &str,
    path: &Path,
) -> Result<IndexBuildSummary, IndexError> {
    let ids = catalog.list_ids().await?;
    if ids.is_empty() {
        return Err(IndexError::EmptyCatalog);
    }

    let mut entries = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(detail) = catalog.find_detail(&id).await? else {
            continue;
        };
        let text = compose_text(&detail);
        let mut vector = embedder
            .embed(&text)
            .await
            .map_err(|error| IndexError::Embedding(format!("product {id}: {error:#}")))?;
        normalize_vector(&mut vector);
        entries.push(IndexEntry { id, text, vector });
    }

    let file = IndexFile { model: model.to_string(), entries };
    file.write(path).await?;
    info!(
        event_name = "semantic_index.built",
        path = %path.display(),
        model = %model,
        entries = file.entries.len(),
        "semantic index written"
    );

    Ok(IndexBuildSummary { model: file.model, path: path.to_path_buf(), entries: file.entries.len() })
}

pub fn compose_text(detail: &ProductDetail) -> String {
    let product = &detail.product;
    let mut parts = vec![
        format!("Product ID: {}", product.id.as_str().trim()),
        format!("Name: {}", product.name.as_deref().unwrap_or("Unknown")),
        format!("Category: {}", product.category.as_deref().unwrap_or("Unknown")),
    ];
    let optional = [
        ("Price per sqft", &product.price_per_sqft),
        ("Size", &product.size_primary),
        ("Color", &product.color),
        ("Finish", &product.finish),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
            parts.push(format!("{label}: {value}"));
        }
    }

    let specs = normalize(&detail.attributes);
    for key in INDEXED_ATTRIBUTES {
        if let Some(value) = specs.get(key).filter(|value| !value.is_empty()) {
            parts.push(format!("{key}: {value}"));
        }
    }

    parts.join("\n")
}

pub fn normalize_vector(vector: &mut [f32]) {
    let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|value| *value /= norm);
    }
}

fn dot(left: &[f32], right: &[f32]) -> f32 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}
