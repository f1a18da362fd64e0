//! HTTP mapping for the webhook service errors.
//!
//! The two webhooks keep the body shapes their callers already branch on:
//! the invoice hook answers `{error, detail}`, the SSO hook answers
//! `{success: false, error_code, message}`.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::Serialize;

use crate::{
    auth::WebhookAuthError,
    services::{InvoiceError, SsoError},
};

/// Error body of `/receive-invoice`.
#[derive(Debug, Serialize)]
pub struct InvoiceErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for InvoiceError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match &self {
            InvoiceError::Unauthorized(reason) => {
                if *reason == WebhookAuthError::NotConfigured {
                    tracing::error!("Invoice webhook called but no api_key is configured");
                }
                (StatusCode::UNAUTHORIZED, "Unauthorized", None)
            }
            InvoiceError::InvalidPayload(detail) => {
                (StatusCode::BAD_REQUEST, "Invalid payload", Some(detail.clone()))
            }
            InvoiceError::MissingSupplier => (StatusCode::BAD_REQUEST, "SupplierName is required", None),
            InvoiceError::Lookup(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invoice matching failed",
                Some(e.to_string()),
            ),
            InvoiceError::Insert(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to insert invoice",
                Some(e.to_string()),
            ),
        };

        (
            status,
            Json(InvoiceErrorBody {
                error: error.to_string(),
                detail,
            }),
        )
            .into_response()
    }
}

/// Error body of `/verify-sso-token`.
#[derive(Debug, Serialize)]
pub struct SsoErrorBody {
    pub success: bool,
    pub error_code: String,
    pub message: String,
}

impl IntoResponse for SsoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "SSO bootstrap failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "SSO bootstrap rejected");
        }

        (
            status,
            Json(SsoErrorBody {
                success: false,
                error_code: self.code().to_string(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invoice_unauthorized_has_no_detail() {
        let response =
            InvoiceError::Unauthorized(WebhookAuthError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn test_invoice_invalid_payload() {
        let response = InvoiceError::InvalidPayload("expected value".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Invalid payload", "detail": "expected value" })
        );
    }

    #[tokio::test]
    async fn test_sso_error_body() {
        let response = SsoError::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": false,
                "error_code": "TOKEN_EXPIRED",
                "message": "SSO token has expired",
            })
        );
    }

    #[tokio::test]
    async fn test_sso_provisioning_failure_is_500() {
        let response = SsoError::SessionCreateFailed("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error_code"], "SESSION_CREATE_FAILED");
        assert_eq!(body["message"], "Session creation failed: boom");
    }
}
