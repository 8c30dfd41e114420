use std::collections::HashSet;

use tracing::debug;

use surfacefit_core::domain::product::{ProductDetail, ProductId};
use surfacefit_core::errors::ApplicationError;
use surfacefit_core::suitability::normalize::normalize;
use surfacefit_db::CatalogRepository;

use crate::semantic::SemanticIndex;
use crate::tools::persistence;

/// Attributes shown in the briefing, with the canonical keys that feed them.
const BRIEFING_ATTRIBUTES: [(&str, &[&str]); 9] = [
    ("Bathroom Floor Use", &["bathroom floor use"]),
    ("Shower Surface", &["shower surface"]),
    ("Placement Location", &["placement location"]),
    ("Water Resistance", &["water resistance"]),
    ("Frost Resistance", &["frost resistance"]),
    ("Radiant Heat Compatible", &["radiant heat compatible", "radiant heat compatibility"]),
    ("Installation Options", &["installation options"]),
    ("Installation Type", &["installation type"]),
    ("Material", &["material"]),
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductContext {
    pub details: Vec<ProductDetail>,
    pub briefing: String,
}

/// Gathers the handful of products most likely relevant to a user turn.
pub struct ContextBuilder<'a> {
    catalog: &'a dyn CatalogRepository,
    index: &'a dyn SemanticIndex,
    top_k: usize,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(catalog: &'a dyn CatalogRepository, index: &'a dyn SemanticIndex, top_k: usize) -> Self {
        Self { catalog, index, top_k }
    }

    pub async fn build(
        &self,
        query: &str,
        active_id: Option<&ProductId>,
    ) -> Result<ProductContext, ApplicationError> {
        let mut candidates: Vec<ProductId> = active_id.into_iter().cloned().collect();

        if !query.trim().is_empty() {
            let lexical = self.catalog.search(query, self.top_k).await.map_err(persistence)?;
            candidates.extend(lexical.into_iter().map(|summary| summary.id));

            let semantic = self.index.search(query, self.top_k).await?;
            candidates.extend(semantic.into_iter().map(|hit| hit.product_id));
        }

        let mut seen = HashSet::new();
        candidates.retain(|id| !id.as_str().is_empty() && seen.insert(id.clone()));
        candidates.truncate(self.top_k);

        let mut details = Vec::with_capacity(candidates.len());
        for id in &candidates {
            if let Some(detail) = self.catalog.find_detail(id).await.map_err(persistence)? {
                details.push(detail);
            }
        }

        debug!(
            event_name = "agent.context.built",
            candidates = candidates.len(),
            resolved = details.len(),
            "retrieval context assembled"
        );

        let briefing = render_briefing(&details);
        Ok(ProductContext { details, briefing })
    }
}

pub fn render_briefing(details: &[ProductDetail]) -> String {
    if details.is_empty() {
        return String::new();
    }

    let mut lines = vec!["Relevant products:".to_string()];
    for (position, detail) in details.iter().enumerate() {
        let product = &detail.product;
        lines.push(format!(
            "{}. {}: {} (Category: {})",
            position + 1,
            product.id,
            product.name.as_deref().unwrap_or("Unnamed"),
            product.category.as_deref().unwrap_or("Unknown"),
        ));

        let specs = normalize(&detail.attributes);
        for (label, keys) in BRIEFING_ATTRIBUTES {
            if let Some(value) = keys.iter().filter_map(|key| specs.get(key)).find(|value| !value.is_empty()) {
                lines.push(format!("   {label}: {value}"));
            }
        }
    }
    lines.push(
        "Use these facts when answering the next user question. Ask for tool calls if you need fresh data."
            .to_string(),
    );
    lines.join("\n")
}
