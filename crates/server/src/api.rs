//! JSON endpoints for product lookup, usage checks and chat.
//!
//! - `GET  /products?q=&limit=`       search the catalog by name or id
//! - `GET  /products/{id}`            full product detail
//! - `POST /products/{id}/usage`      run the suitability rules for one use case
//! - `POST /chat`                     agent conversation turn

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use surfacefit_agent::tools::{check_usage, persistence, require_detail};
use surfacefit_agent::{AgentRuntime, ChatRequest, ChatResponse};
use surfacefit_core::domain::product::{ProductDetail, ProductId, ProductSummary};
use surfacefit_core::domain::usage::{UsageVerdict, UseCase};
use surfacefit_core::errors::{ApplicationError, InterfaceError};

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;

#[derive(Clone)]
pub struct ApiState {
    runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UsageRequest {
    #[serde(rename = "useCase", alias = "use_case")]
    pub use_case: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

/// Interface error rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    fn from_application(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::PreconditionFailed { .. } => StatusCode::PRECONDITION_FAILED,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.0.user_message(),
            detail: self.0.message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                event_name = "api.request.failed",
                correlation_id = %self.0.correlation_id(),
                status = status.as_u16(),
                error = %self.0,
                "request failed"
            );
        } else {
            warn!(
                event_name = "api.request.rejected",
                correlation_id = %self.0.correlation_id(),
                status = status.as_u16(),
                error = %self.0,
                "request rejected"
            );
        }
        (status, Json(self.body())).into_response()
    }
}

pub fn router(runtime: Arc<AgentRuntime>) -> Router {
    Router::new()
        .route("/products", get(search_products))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/usage", post(post_usage))
        .route("/chat", post(post_chat))
        .with_state(ApiState { runtime })
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub async fn search_products(
    State(state): State<ApiState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let correlation_id = correlation_id();
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);

    let results = state
        .runtime
        .catalog()
        .search(&params.q, limit)
        .await
        .map_err(|error| ApiError::from_application(persistence(error), &correlation_id))?;
    Ok(Json(results))
}

pub async fn get_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>, ApiError> {
    let correlation_id = correlation_id();
    let detail = require_detail(state.runtime.catalog(), &ProductId::new(id))
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;
    Ok(Json(detail))
}

pub async fn post_usage(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(body): Json<UsageRequest>,
) -> Result<Json<UsageVerdict>, ApiError> {
    let correlation_id = correlation_id();
    let reject = |error: ApplicationError| ApiError::from_application(error, &correlation_id);

    let use_case: UseCase = body.use_case.parse().map_err(|error| reject(ApplicationError::from(error)))?;
    let (_, verdict) =
        check_usage(state.runtime.catalog(), &ProductId::new(id), use_case).await.map_err(reject)?;

    info!(
        event_name = "api.usage.checked",
        correlation_id = %correlation_id,
        product_id = %verdict.product_id,
        use_case = %verdict.use_case,
        ok = ?verdict.ok,
        "usage check answered"
    );
    Ok(Json(verdict))
}

pub async fn post_chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let correlation_id = correlation_id();
    info!(
        event_name = "api.chat.received",
        correlation_id = %correlation_id,
        messages = request.messages.len(),
        "chat request received"
    );

    let response = state
        .runtime
        .handle_chat(request, &correlation_id)
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;
    Ok(Json(response))
}
