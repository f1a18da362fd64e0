pub mod error;
pub mod health;
pub mod invoices;
pub mod sso;

use axum::{Router, routing::post};
use http::StatusCode;

use crate::AppState;

/// Webhook routes. Each answers a bare `OPTIONS` with an empty 200.
pub fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/receive-invoice",
            post(invoices::receive_invoice).options(preflight),
        )
        .route(
            "/verify-sso-token",
            post(sso::verify_sso_token).options(preflight),
        )
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}
