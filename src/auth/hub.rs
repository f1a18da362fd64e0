//! Signature verification through the SSO hub.
//!
//! The hub signs identity assertions; this service never sees the signing
//! key. Every assertion is posted back to the hub as `{payload, signature}`
//! and only an explicit approval is accepted. Two response shapes exist:
//!
//! ```json
//! { "valid": true, "payload": { "email": "..." } }
//! { "success": false, "error": "INVALID_SIGNATURE" }
//! ```
//!
//! The second is the legacy shape older hub deployments still return.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Fallback code when the hub answers non-2xx without one of its own.
pub const HUB_ERROR_CODE: &str = "HUB_ERROR";
/// Fallback code when the hub declines a signature without saying why.
pub const INVALID_SIGNATURE_CODE: &str = "INVALID_SIGNATURE";

#[derive(Debug, Error)]
pub enum HubError {
    /// The request never produced an HTTP response.
    #[error("SSO hub unreachable: {0}")]
    Unreachable(String),

    /// The hub answered with a non-2xx status.
    #[error("SSO hub returned {status}: {code}")]
    Rejected {
        status: u16,
        code: String,
        message: Option<String>,
    },

    /// 2xx, but the body is not one of the known shapes.
    #[error("Unexpected SSO hub response: {0}")]
    UnexpectedResponse(String),

    /// The hub looked at the signature and said no.
    #[error("Signature rejected by SSO hub: {code}")]
    InvalidSignature {
        code: String,
        message: Option<String>,
    },
}

#[async_trait]
pub trait HubVerifier: Send + Sync {
    /// Ask the hub to vouch for `payload`.
    ///
    /// Returns the payload to trust: the hub's own copy when it sends one,
    /// otherwise the submitted payload.
    async fn verify(&self, payload: &Value, signature: &str) -> Result<Value, HubError>;
}

/// [`HubVerifier`] speaking JSON over HTTP to a fixed hub endpoint.
pub struct HttpHubVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpHubVerifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl HubVerifier for HttpHubVerifier {
    async fn verify(&self, payload: &Value, signature: &str) -> Result<Value, HubError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "payload": payload, "signature": signature }))
            .send()
            .await
            .map_err(|e| HubError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HubError::Unreachable(format!("Failed to read hub response: {e}")))?;

        if !status.is_success() {
            let parsed = serde_json::from_str::<Value>(&body).ok();
            let code = parsed
                .as_ref()
                .and_then(error_code)
                .unwrap_or_else(|| HUB_ERROR_CODE.to_string());
            let message = parsed.as_ref().and_then(error_message);
            tracing::warn!(status = status.as_u16(), code = %code, "SSO hub returned an error status");
            return Err(HubError::Rejected {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let body: Value = serde_json::from_str(&body)
            .map_err(|e| HubError::UnexpectedResponse(format!("invalid JSON: {e}")))?;

        interpret(body, payload)
    }
}

/// Turn a 2xx hub body into a verdict.
fn interpret(body: Value, submitted: &Value) -> Result<Value, HubError> {
    let verdict = body
        .get("valid")
        .and_then(Value::as_bool)
        .or_else(|| body.get("success").and_then(Value::as_bool))
        .ok_or_else(|| {
            HubError::UnexpectedResponse(
                "response has neither a boolean 'valid' nor 'success' field".to_string(),
            )
        })?;

    if !verdict {
        return Err(HubError::InvalidSignature {
            code: error_code(&body).unwrap_or_else(|| INVALID_SIGNATURE_CODE.to_string()),
            message: error_message(&body),
        });
    }

    match body.get("payload") {
        Some(returned @ Value::Object(_)) => Ok(returned.clone()),
        _ => Ok(submitted.clone()),
    }
}

/// `error_code`, `code`, or a string `error`, in that order.
fn error_code(body: &Value) -> Option<String> {
    ["error_code", "code", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
