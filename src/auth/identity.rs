//! Identity-provider admin API client.
//!
//! The identity provider owns user accounts and sessions. This module talks
//! to its admin API with the service key: listing and creating users,
//! overwriting user metadata, and minting a session by generating a one-time
//! magic-link token and redeeming it straight away.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity provider request failed: {0}")]
    Transport(String),

    #[error("Identity provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A user with this email already exists.
    #[error("User already registered")]
    AlreadyRegistered,

    #[error("Unexpected identity provider response: {0}")]
    UnexpectedResponse(String),
}

/// User record as returned by the admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl IdentityUser {
    /// Case-insensitive email comparison against an already-normalized address.
    pub fn has_email(&self, normalized: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|email| email.trim().eq_ignore_ascii_case(normalized))
    }
}

/// Input for [`IdentityProvider::create_user`].
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Preferred id. The provider keeps it when it is free.
    pub id: Option<Uuid>,
    pub email: String,
    pub metadata: Value,
}

/// A freshly minted session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// One page of users. Pages start at 1.
    async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<IdentityUser>, IdentityError>;

    /// Create a user with a confirmed email.
    async fn create_user(&self, input: &NewIdentity) -> Result<IdentityUser, IdentityError>;

    /// Replace the user's metadata.
    async fn update_user_metadata(&self, id: Uuid, metadata: &Value) -> Result<(), IdentityError>;

    /// Generate a one-time magic-link token for `email`, returning its hash.
    async fn generate_magic_link(&self, email: &str) -> Result<String, IdentityError>;

    /// Redeem a magic-link token hash for a session.
    async fn redeem_magic_link(&self, token_hash: &str) -> Result<Session, IdentityError>;
}

/// [`IdentityProvider`] backed by the hosted auth admin API.
pub struct AdminApiIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl AdminApiIdentityProvider {
    pub fn new(client: reqwest::Client, base_url: &str, service_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Send and decode a JSON body, mapping non-2xx statuses to [`IdentityError::Api`].
    async fn send(&self, request: RequestBuilder) -> Result<Value, IdentityError> {
        let response = request
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;
        let parsed = serde_json::from_str::<Value>(&body).ok();

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .and_then(api_message)
                .unwrap_or_else(|| truncate(&body));
            if is_already_registered(status, parsed.as_ref(), &message) {
                return Err(IdentityError::AlreadyRegistered);
            }
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Some endpoints answer 204 or an empty 200.
        Ok(parsed.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl IdentityProvider for AdminApiIdentityProvider {
    async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<IdentityUser>, IdentityError> {
        let body = self
            .send(
                self.request(Method::GET, "/admin/users")
                    .query(&[("page", page), ("per_page", per_page)]),
            )
            .await?;

        // `{ "users": [...] }`, or a bare array from older deployments.
        let users = match body {
            Value::Object(mut map) => map.remove("users").unwrap_or(Value::Array(Vec::new())),
            other => other,
        };
        serde_json::from_value(users)
            .map_err(|e| IdentityError::UnexpectedResponse(format!("user list: {e}")))
    }

    async fn create_user(&self, input: &NewIdentity) -> Result<IdentityUser, IdentityError> {
        let mut body = serde_json::json!({
            "email": input.email,
            "email_confirm": true,
            "user_metadata": input.metadata,
        });
        if let Some(id) = input.id {
            body["id"] = Value::String(id.to_string());
        }

        let created = self
            .send(self.request(Method::POST, "/admin/users").json(&body))
            .await?;

        // Either the user itself or `{ "user": {...} }`.
        let user = match created {
            Value::Object(mut map) if map.contains_key("user") => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(user)
            .map_err(|e| IdentityError::UnexpectedResponse(format!("created user: {e}")))
    }

    async fn update_user_metadata(&self, id: Uuid, metadata: &Value) -> Result<(), IdentityError> {
        self.send(
            self.request(Method::PUT, &format!("/admin/users/{id}"))
                .json(&serde_json::json!({ "user_metadata": metadata })),
        )
        .await?;
        Ok(())
    }

    async fn generate_magic_link(&self, email: &str) -> Result<String, IdentityError> {
        let body = self
            .send(
                self.request(Method::POST, "/admin/generate_link")
                    .json(&serde_json::json!({ "type": "magiclink", "email": email })),
            )
            .await?;

        body.get("hashed_token")
            .or_else(|| body.pointer("/properties/hashed_token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                IdentityError::UnexpectedResponse("generate_link returned no hashed_token".into())
            })
    }

    async fn redeem_magic_link(&self, token_hash: &str) -> Result<Session, IdentityError> {
        let body = self
            .send(
                self.request(Method::POST, "/verify")
                    .json(&serde_json::json!({ "type": "magiclink", "token_hash": token_hash })),
            )
            .await?;

        // Either the session itself or `{ "session": {...} }`.
        let session = match body {
            Value::Object(mut map) if map.contains_key("session") => {
                map.remove("session").unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(session)
            .map_err(|e| IdentityError::UnexpectedResponse(format!("session: {e}")))
    }
}

fn api_message(body: &Value) -> Option<String> {
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn is_already_registered(status: StatusCode, body: Option<&Value>, message: &str) -> bool {
    if !matches!(
        status,
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST
    ) {
        return false;
    }
    let code = body
        .and_then(|b| b.get("error_code").or_else(|| b.get("code")))
        .and_then(Value::as_str);
    if matches!(code, Some("email_exists" | "user_already_exists")) {
        return true;
    }
    let message = message.to_ascii_lowercase();
    message.contains("already registered") || message.contains("already been registered")
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
