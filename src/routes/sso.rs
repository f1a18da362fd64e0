//! `POST /verify-sso-token`: hub-signed SSO session bootstrap.

use axum::{Json, body::Bytes, extract::State};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::{
    AppState,
    models::AppRole,
    services::{SsoBootstrap, SsoError, SsoUser, parse_request},
};

#[derive(Debug, Serialize)]
pub struct SsoResponse {
    pub success: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub user: SsoUser,
    /// Passed through from the assertion untouched.
    pub preferences: Option<Value>,
    pub roles: Vec<AppRole>,
}

impl From<SsoBootstrap> for SsoResponse {
    fn from(bootstrap: SsoBootstrap) -> Self {
        Self {
            success: true,
            access_token: bootstrap.session.access_token,
            refresh_token: bootstrap.session.refresh_token,
            user: bootstrap.user,
            preferences: bootstrap.preferences,
            roles: bootstrap.roles,
        }
    }
}

#[tracing::instrument(name = "webhook.verify_sso_token", skip_all)]
pub async fn verify_sso_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SsoResponse>, SsoError> {
    let request = parse_request(&body)?;
    let bootstrap = state.services.sso.bootstrap(request, Utc::now()).await?;
    Ok(Json(bootstrap.into()))
}
