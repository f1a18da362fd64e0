//! Health check endpoints for Kubernetes probes and monitoring.

use axum::{Json, extract::State, response::IntoResponse};
use http::StatusCode;
use serde::Serialize;

use crate::AppState;

/// Detailed health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Service version
    pub version: String,
    /// Individual subsystem statuses
    pub subsystems: SubsystemStatus,
}

/// Status of individual subsystems.
#[derive(Debug, Serialize)]
pub struct SubsystemStatus {
    /// Database connection status
    pub database: ComponentStatus,
}

/// Status of a single component.
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

/// Full health check with subsystem status.
#[tracing::instrument(name = "health.check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = std::time::Instant::now();
    let db_result = state.db.health_check().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let healthy = db_result.is_ok();
    let database = ComponentStatus {
        healthy,
        message: db_result.err().map(|e| {
            tracing::warn!(error = %e, "Database health check failed");
            "Database connection failed".to_string()
        }),
        latency_ms,
    };

    let health = HealthStatus {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        subsystems: SubsystemStatus { database },
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health))
}

/// Kubernetes liveness probe. Always 200 while the process serves requests.
#[tracing::instrument(name = "health.liveness")]
pub async fn liveness() -> impl IntoResponse {
    StatusCode::OK
}

/// Kubernetes readiness probe. 503 while the database is unreachable.
#[tracing::instrument(name = "health.readiness", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await.is_err() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}

#[cfg(all(test, feature = "database-sqlite"))]
mod tests {
    use axum::{Router, body::Body};
    use http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{config::HooksConfig, db::DbPool, db::tests::harness::migrated_sqlite_pool};

    const CONFIG: &str = r#"
[database]
type = "sqlite"
path = ":memory:"
"#;

    async fn test_app() -> (Router, sqlx::SqlitePool) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let config = HooksConfig::from_str(CONFIG).expect("Failed to parse test config");
        let pool = migrated_sqlite_pool().await;
        let state = crate::AppState::from_parts(
            config.clone(),
            DbPool::from_sqlite(pool.clone()),
            reqwest::Client::new(),
        );
        (crate::build_app(&config, state), pool)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_check_healthy() {
        let (app, _pool) = test_app().await;

        let (status, body) = get(&app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["subsystems"]["database"]["healthy"], true);
        assert!(body["subsystems"]["database"]["latency_ms"].is_number());
    }

    #[tokio::test]
    async fn test_probes() {
        let (app, _pool) = test_app().await;

        assert_eq!(get(&app, "/health/live").await.0, StatusCode::OK);
        assert_eq!(get(&app, "/health/ready").await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unhealthy_when_database_closed() {
        let (app, pool) = test_app().await;
        pool.close().await;

        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["subsystems"]["database"]["message"], "Database connection failed");

        assert_eq!(get(&app, "/health/ready").await.0, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(get(&app, "/health/live").await.0, StatusCode::OK);
    }
}
