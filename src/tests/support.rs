use axum::{Router, body::Body};
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use wiremock::MockServer;

use crate::{config::HooksConfig, db::DbPool, db::tests::harness::migrated_sqlite_pool};

pub const API_KEY: &str = "whsec_test_key";

/// A router over a fresh SQLite database, with the hub and identity
/// provider pointed at mock servers.
pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub hub: MockServer,
    pub identity: MockServer,
}

impl TestApp {
    pub async fn start() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let hub = MockServer::start().await;
        let identity = MockServer::start().await;
        let config = HooksConfig::from_str(&format!(
            r#"
[database]
type = "sqlite"
path = ":memory:"

[invoices]
api_key = "{API_KEY}"

[sso]
hub_url = "{hub}/api/verify-signature"
auth_url = "{identity}"
service_key = "service-key"
"#,
            hub = hub.uri(),
            identity = identity.uri(),
        ))
        .expect("Failed to parse test config");

        let pool = migrated_sqlite_pool().await;
        let state = crate::AppState::from_parts(
            config.clone(),
            DbPool::from_sqlite(pool.clone()),
            reqwest::Client::new(),
        );

        Self {
            app: crate::build_app(&config, state),
            pool,
            hub,
            identity,
        }
    }

    pub fn db(&self) -> DbPool {
        DbPool::from_sqlite(self.pool.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    pub async fn post_json(
        &self,
        uri: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}
