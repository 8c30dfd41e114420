use std::path::{Path, PathBuf};

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use surfacefit_db::{ping, DbPool};

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    index_path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: HealthCheck,
    pub semantic_index: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, index_path: PathBuf) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool, index_path })
}

/// Readiness follows the database. A missing index is reported but does not
/// fail the check.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match ping(&state.db_pool).await {
        Ok(()) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    };
    let semantic_index = index_check(&state.index_path).await;
    let ready = database.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        database,
        semantic_index,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn index_check(path: &Path) -> HealthCheck {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => HealthCheck {
            status: "ready",
            detail: format!("semantic index present at {}", path.display()),
        },
        _ => HealthCheck {
            status: "missing",
            detail: format!(
                "semantic index not found at {}; run `surfacefit build-index`",
                path.display()
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};
    use surfacefit_db::connect_with_settings;

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_reports_ready_database_and_present_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        let index_path = dir.path().join("index.json");
        std::fs::write(&index_path, r#"{"model":"m","entries":[]}"#).expect("write index");
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");

        let (status, Json(payload)) =
            health(State(HealthState { db_pool: pool.clone(), index_path })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.database.status, "ready");
        assert_eq!(payload.semantic_index.status, "ready");

        pool.close().await;
    }

    #[tokio::test]
    async fn missing_index_does_not_fail_readiness() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");

        let (status, Json(payload)) = health(State(HealthState {
            db_pool: pool.clone(),
            index_path: dir.path().join("absent.json"),
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.semantic_index.status, "missing");
        assert!(payload.semantic_index.detail.contains("surfacefit build-index"));

        pool.close().await;
    }

    #[tokio::test]
    async fn closed_database_is_service_unavailable() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
        pool.close().await;

        let (status, Json(payload)) =
            health(State(HealthState { db_pool: pool, index_path: "absent.json".into() })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.database.status, "degraded");
    }
}
