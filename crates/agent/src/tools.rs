use serde_json::{json, Map, Value};
use tracing::debug;

use surfacefit_core::config::AgentConfig;
use surfacefit_core::domain::product::{ProductDetail, ProductId};
use surfacefit_core::domain::usage::{UsageVerdict, UseCase};
use surfacefit_core::errors::{ApplicationError, DomainError};
use surfacefit_core::suitability::evaluate;
use surfacefit_db::{CatalogRepository, RepositoryError};

const PRODUCT_ID_ALIASES: [&str; 3] = ["product_id", "sku", "id"];

/// Bounds applied to `search_products` limits requested by the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl From<&AgentConfig> for SearchLimits {
    fn from(config: &AgentConfig) -> Self {
        Self { default_limit: config.search_default_limit, max_limit: config.search_max_limit }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

/// The closed set of tools the model may call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentTool {
    SearchProducts { query: String, limit: usize },
    GetProductDetail { product_id: ProductId },
    CheckUsage { product_id: ProductId, use_case: UseCase },
}

/// Result of one tool call: the JSON handed back to the model and any
/// product details the call touched.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolOutcome {
    pub payload: Value,
    pub touched: Vec<ProductDetail>,
}

impl AgentTool {
    pub fn parse(
        tool_name: &str,
        arguments: &Map<String, Value>,
        limits: SearchLimits,
    ) -> Result<Self, DomainError> {
        match tool_name {
            "search_products" => Ok(Self::SearchProducts {
                query: arguments.get("query").and_then(Value::as_str).unwrap_or_default().to_string(),
                limit: requested_limit(arguments.get("limit"), limits),
            }),
            "get_product_detail" => {
                Ok(Self::GetProductDetail { product_id: product_id_argument(tool_name, arguments)? })
            }
            "check_usage" => {
                let product_id = product_id_argument(tool_name, arguments)?;
                let use_case = arguments
                    .get("use_case")
                    .and_then(Value::as_str)
                    .filter(|value| !value.trim().is_empty())
                    .ok_or_else(|| DomainError::MissingArgument {
                        tool: tool_name.to_string(),
                        argument: "use_case",
                    })?
                    .parse()?;
                Ok(Self::CheckUsage { product_id, use_case })
            }
            other => Err(DomainError::UnsupportedTool(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SearchProducts { .. } => "search_products",
            Self::GetProductDetail { .. } => "get_product_detail",
            Self::CheckUsage { .. } => "check_usage",
        }
    }

    pub async fn execute(
        &self,
        catalog: &dyn CatalogRepository,
    ) -> Result<ToolOutcome, ApplicationError> {
        match self {
            Self::SearchProducts { query, limit } => {
                let results = catalog.search(query, *limit).await.map_err(persistence)?;
                debug!(
                    event_name = "agent.tool.search",
                    query = %query,
                    limit = *limit,
                    hits = results.len(),
                    "catalog search executed"
                );
                Ok(ToolOutcome { payload: json!({ "results": results }), touched: Vec::new() })
            }
            Self::GetProductDetail { product_id } => {
                let detail = require_detail(catalog, product_id).await?;
                Ok(ToolOutcome { payload: to_payload(&detail)?, touched: vec![detail] })
            }
            Self::CheckUsage { product_id, use_case } => {
                let (detail, verdict) = check_usage(catalog, product_id, *use_case).await?;
                Ok(ToolOutcome { payload: to_payload(&verdict)?, touched: vec![detail] })
            }
        }
    }
}

/// Loads a product and runs its suitability rules for one use case.
pub async fn check_usage(
    catalog: &dyn CatalogRepository,
    product_id: &ProductId,
    use_case: UseCase,
) -> Result<(ProductDetail, UsageVerdict), ApplicationError> {
    let detail = require_detail(catalog, product_id).await?;
    let verdict = evaluate(&detail, use_case);
    Ok((detail, verdict))
}

pub async fn require_detail(
    catalog: &dyn CatalogRepository,
    product_id: &ProductId,
) -> Result<ProductDetail, ApplicationError> {
    catalog
        .find_detail(product_id)
        .await
        .map_err(persistence)?
        .ok_or_else(|| ApplicationError::ProductNotFound(product_id.to_string()))
}

pub fn persistence(error: RepositoryError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

fn to_payload<T: serde::Serialize>(value: &T) -> Result<Value, ApplicationError> {
    serde_json::to_value(value)
        .map_err(|error| ApplicationError::Persistence(format!("failed to encode tool result: {error}")))
}

fn product_id_argument(
    tool_name: &str,
    arguments: &Map<String, Value>,
) -> Result<ProductId, DomainError> {
    PRODUCT_ID_ALIASES
        .iter()
        .filter_map(|alias| arguments.get(*alias))
        .find_map(|value| match value {
            Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
        .map(ProductId)
        .ok_or_else(|| DomainError::MissingArgument {
            tool: tool_name.to_string(),
            argument: "product_id",
        })
}

// Models send limits as numbers or numeric strings; anything else means default.
fn requested_limit(value: Option<&Value>, limits: SearchLimits) -> usize {
    let requested = match value {
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(text)) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    requested
        .and_then(|limit| usize::try_from(limit).ok())
        .unwrap_or(limits.default_limit)
        .min(limits.max_limit)
}
