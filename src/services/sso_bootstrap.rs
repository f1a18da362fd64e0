//! Turns a hub-signed identity assertion into a local user and a fresh session.
//!
//! The hub is the only party that can vouch for an assertion. Once it has,
//! the user is found (or created) in the identity provider, its metadata,
//! profile and role set are overwritten from the assertion, and a session is
//! minted through a one-time magic link.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::{HubError, HubVerifier, IdentityError, IdentityProvider, NewIdentity, Session},
    config::SsoConfig,
    db::{DbPool, OrganizationRepo, ProfileRepo, UserRoleRepo},
    models::{
        AppRole, Organization, SsoPayload, TargetView, UpsertProfile, VerifySsoRequest,
        normalize_email, resolve_roles,
    },
};

#[derive(Debug, Error)]
pub enum SsoError {
    #[error("{0}")]
    MissingData(String),

    #[error("Unknown target_view '{0}'")]
    InvalidTargetView(String),

    #[error("Verified payload is invalid: {0}")]
    InvalidPayload(String),

    #[error("SSO hub unreachable: {0}")]
    HubUnreachable(String),

    /// Non-2xx from the hub. 4xx answers become 401, 5xx become 500.
    #[error("SSO hub rejected the request ({status}): {message}")]
    HubRejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected SSO hub response: {0}")]
    UnexpectedHubResponse(String),

    #[error("{message}")]
    InvalidSignature { code: String, message: String },

    #[error("SSO token has expired")]
    TokenExpired,

    #[error("organization_id is required")]
    MissingOrganizationId,

    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("User lookup failed: {0}")]
    UserLookupFailed(String),

    #[error("User creation failed: {0}")]
    UserCreateFailed(String),

    #[error("User sync failed: {0}")]
    UserSyncFailed(String),

    #[error("Magic link generation failed: {0}")]
    LinkGenerationFailed(String),

    #[error("Session creation failed: {0}")]
    SessionCreateFailed(String),
}

impl SsoError {
    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &str {
        match self {
            SsoError::MissingData(_) => "MISSING_DATA",
            SsoError::InvalidTargetView(_) => "INVALID_TARGET_VIEW",
            SsoError::InvalidPayload(_) => "INVALID_PAYLOAD",
            SsoError::HubUnreachable(_) => "HUB_UNREACHABLE",
            SsoError::HubRejected { code, .. } => code.as_str(),
            SsoError::UnexpectedHubResponse(_) => "UNEXPECTED_HUB_RESPONSE",
            SsoError::InvalidSignature { code, .. } => code.as_str(),
            SsoError::TokenExpired => "TOKEN_EXPIRED",
            SsoError::MissingOrganizationId => "MISSING_ORGANIZATION_ID",
            SsoError::OrganizationNotFound(_) => "ORGANIZATION_NOT_FOUND",
            SsoError::UserLookupFailed(_) => "USER_LOOKUP_FAILED",
            SsoError::UserCreateFailed(_) => "USER_CREATE_FAILED",
            SsoError::UserSyncFailed(_) => "USER_SYNC_FAILED",
            SsoError::LinkGenerationFailed(_) => "LINK_GENERATION_FAILED",
            SsoError::SessionCreateFailed(_) => "SESSION_CREATE_FAILED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SsoError::MissingData(_)
            | SsoError::InvalidTargetView(_)
            | SsoError::InvalidPayload(_)
            | SsoError::MissingOrganizationId => StatusCode::BAD_REQUEST,
            SsoError::InvalidSignature { .. } | SsoError::TokenExpired => StatusCode::UNAUTHORIZED,
            SsoError::HubRejected { status, .. } if *status < 500 => StatusCode::UNAUTHORIZED,
            SsoError::OrganizationNotFound(_) => StatusCode::NOT_FOUND,
            SsoError::HubRejected { .. }
            | SsoError::HubUnreachable(_)
            | SsoError::UnexpectedHubResponse(_)
            | SsoError::UserLookupFailed(_)
            | SsoError::UserCreateFailed(_)
            | SsoError::UserSyncFailed(_)
            | SsoError::LinkGenerationFailed(_)
            | SsoError::SessionCreateFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<HubError> for SsoError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::Unreachable(detail) => SsoError::HubUnreachable(detail),
            HubError::Rejected {
                status,
                code,
                message,
            } => SsoError::HubRejected {
                status,
                message: message.unwrap_or_else(|| format!("SSO hub returned {status}")),
                code,
            },
            HubError::UnexpectedResponse(detail) => SsoError::UnexpectedHubResponse(detail),
            HubError::InvalidSignature { code, message } => SsoError::InvalidSignature {
                code,
                message: message.unwrap_or_else(|| "Invalid SSO signature".to_string()),
            },
        }
    }
}

/// A validated `/verify-sso-token` request, before hub verification.
#[derive(Debug, Clone)]
pub struct SsoRequest {
    pub payload: Value,
    pub signature: String,
    pub target_view: Option<TargetView>,
}

/// Decode and shape-check a request body.
pub fn parse_request(body: &[u8]) -> Result<SsoRequest, SsoError> {
    let request: VerifySsoRequest = serde_json::from_slice(body)
        .map_err(|e| SsoError::MissingData(format!("Invalid request body: {e}")))?;

    let payload = match request.payload {
        Some(payload @ Value::Object(_)) => payload,
        _ => return Err(SsoError::MissingData("payload is required".into())),
    };
    let signature = request
        .signature
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SsoError::MissingData("signature is required".into()))?;
    if !payload
        .get("email")
        .and_then(Value::as_str)
        .is_some_and(|email| !email.trim().is_empty())
    {
        return Err(SsoError::MissingData("payload.email is required".into()));
    }

    let target_view = match request.target_view.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(view) => Some(
            view.parse::<TargetView>()
                .map_err(|_| SsoError::InvalidTargetView(view.to_string()))?,
        ),
    };

    Ok(SsoRequest {
        payload,
        signature,
        target_view,
    })
}

/// Reject assertions whose `expires_at` is missing or not in the future.
pub fn check_expiry(payload: &SsoPayload, now: DateTime<Utc>) -> Result<(), SsoError> {
    match payload.expires_at {
        Some(expires_at) if expires_at > now => Ok(()),
        _ => Err(SsoError::TokenExpired),
    }
}

/// The user block of a successful response.
#[derive(Debug, Clone, Serialize)]
pub struct SsoUser {
    pub id: Uuid,
    pub email: String,
    pub organization_id: Uuid,
    pub full_name: Option<String>,
    pub sso_user: bool,
}

/// Everything a successful bootstrap hands back to the caller.
#[derive(Debug, Clone)]
pub struct SsoBootstrap {
    pub session: Session,
    pub user: SsoUser,
    pub preferences: Option<Value>,
    pub roles: Vec<AppRole>,
}

pub struct SsoBootstrapService {
    hub: Arc<dyn HubVerifier>,
    identity: Arc<dyn IdentityProvider>,
    organizations: Arc<dyn OrganizationRepo>,
    profiles: Arc<dyn ProfileRepo>,
    user_roles: Arc<dyn UserRoleRepo>,
    config: SsoConfig,
}

impl SsoBootstrapService {
    pub fn new(
        db: &DbPool,
        hub: Arc<dyn HubVerifier>,
        identity: Arc<dyn IdentityProvider>,
        config: SsoConfig,
    ) -> Self {
        Self {
            hub,
            identity,
            organizations: db.organizations(),
            profiles: db.profiles(),
            user_roles: db.user_roles(),
            config,
        }
    }

    /// Run the full handshake for a parsed request.
    pub async fn bootstrap(
        &self,
        request: SsoRequest,
        now: DateTime<Utc>,
    ) -> Result<SsoBootstrap, SsoError> {
        let verified = self
            .hub
            .verify(&request.payload, &request.signature)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "SSO hub did not approve assertion"))?;

        let payload: SsoPayload = serde_json::from_value(verified)
            .map_err(|e| SsoError::InvalidPayload(e.to_string()))?;
        let email = normalize_email(&payload.email);
        if email.is_empty() {
            return Err(SsoError::InvalidPayload("email is empty".into()));
        }

        if let Err(e) = check_expiry(&payload, now) {
            tracing::warn!(email = %email, expires_at = ?payload.expires_at, "Rejecting expired or unbounded SSO assertion");
            return Err(e);
        }

        let organization = self.resolve_organization(&payload).await?;
        let user_id = self.resolve_identity(&email, &payload).await?;
        let roles = self
            .sync_metadata_and_roles(user_id, &email, &payload, &organization, request.target_view)
            .await?;
        let session = self.materialize_session(&email).await?;

        tracing::info!(
            email = %email,
            user_id = %user_id,
            organization_id = %organization.id,
            roles = ?roles,
            "SSO session issued"
        );

        Ok(SsoBootstrap {
            session,
            user: SsoUser {
                id: user_id,
                email,
                organization_id: organization.id,
                full_name: payload.display_name().map(str::to_string),
                sso_user: true,
            },
            preferences: payload.preferences,
            roles,
        })
    }

    /// Organization named by the assertion, or the legacy oldest-organization
    /// fallback when enabled.
    pub async fn resolve_organization(&self, payload: &SsoPayload) -> Result<Organization, SsoError> {
        let lookup_failed = |e: crate::db::DbError| SsoError::UserLookupFailed(e.to_string());

        match payload.organization_id {
            Some(id) => self
                .organizations
                .get_by_id(id)
                .await
                .map_err(lookup_failed)?
                .ok_or_else(|| SsoError::OrganizationNotFound(id.to_string())),
            None if self.config.legacy_org_fallback => {
                // TODO: drop once every hub client sends organization_id.
                tracing::warn!(
                    email = %payload.email,
                    "SSO assertion without organization_id; using oldest organization (deprecated fallback)"
                );
                self.organizations
                    .first_created()
                    .await
                    .map_err(lookup_failed)?
                    .ok_or_else(|| SsoError::OrganizationNotFound("no organizations exist".into()))
            }
            None => Err(SsoError::MissingOrganizationId),
        }
    }

    /// Identity id for `email`: profile first, then the provider's user list,
    /// then a new user.
    pub async fn resolve_identity(&self, email: &str, payload: &SsoPayload) -> Result<Uuid, SsoError> {
        if let Some(profile) = self
            .profiles
            .get_by_email(email)
            .await
            .map_err(|e| SsoError::UserLookupFailed(e.to_string()))?
        {
            tracing::debug!(email, user_id = %profile.id, "SSO user found by profile");
            return Ok(profile.id);
        }

        if let Some(id) = self.scan_users(email).await? {
            tracing::debug!(email, user_id = %id, "SSO user found in identity provider");
            return Ok(id);
        }

        let input = NewIdentity {
            id: payload.user_id_hint(),
            email: email.to_string(),
            metadata: user_metadata(payload),
        };
        match self.identity.create_user(&input).await {
            Ok(user) => {
                tracing::info!(email, user_id = %user.id, "Created SSO user");
                Ok(user.id)
            }
            Err(IdentityError::AlreadyRegistered) => {
                // Registered between the scan and the create, or beyond the scanned pages.
                self.scan_users(email).await?.ok_or_else(|| {
                    SsoError::UserCreateFailed(format!(
                        "{email} is already registered but could not be found"
                    ))
                })
            }
            Err(e) => Err(SsoError::UserCreateFailed(e.to_string())),
        }
    }

    async fn scan_users(&self, email: &str) -> Result<Option<Uuid>, SsoError> {
        let per_page = self.config.user_scan_page_size;
        for page in 1..=self.config.user_scan_max_pages {
            let users = self
                .identity
                .list_users(page, per_page)
                .await
                .map_err(|e| SsoError::UserLookupFailed(e.to_string()))?;

            if let Some(user) = users.iter().find(|u| u.has_email(email)) {
                return Ok(Some(user.id));
            }
            if users.len() < per_page as usize {
                break;
            }
        }
        Ok(None)
    }

    /// Overwrite provider metadata, the profile row, and the role set.
    pub async fn sync_metadata_and_roles(
        &self,
        user_id: Uuid,
        email: &str,
        payload: &SsoPayload,
        organization: &Organization,
        target_view: Option<TargetView>,
    ) -> Result<Vec<AppRole>, SsoError> {
        let sync_failed = |e: &dyn std::fmt::Display| SsoError::UserSyncFailed(e.to_string());

        let mut metadata = user_metadata(payload);
        metadata["organization_id"] = Value::String(organization.id.to_string());
        self.identity
            .update_user_metadata(user_id, &metadata)
            .await
            .map_err(|e| sync_failed(&e))?;

        self.profiles
            .upsert(UpsertProfile {
                id: user_id,
                email: email.to_string(),
                full_name: payload.display_name().map(str::to_string),
                organization_id: Some(organization.id),
                sso_user: true,
            })
            .await
            .map_err(|e| sync_failed(&e))?;

        let roles = resolve_roles(payload.roles.as_deref(), target_view);
        let sync = self
            .user_roles
            .replace_roles(user_id, &roles)
            .await
            .map_err(|e| sync_failed(&e))?;
        if !sync.is_noop() {
            tracing::info!(
                user_id = %user_id,
                added = ?sync.added,
                removed = ?sync.removed,
                "Updated SSO user roles"
            );
        }

        Ok(roles)
    }

    /// Mint a session by generating and immediately redeeming a magic link.
    pub async fn materialize_session(&self, email: &str) -> Result<Session, SsoError> {
        let token_hash = self
            .identity
            .generate_magic_link(email)
            .await
            .map_err(|e| SsoError::LinkGenerationFailed(e.to_string()))?;

        self.identity
            .redeem_magic_link(&token_hash)
            .await
            .map_err(|e| SsoError::SessionCreateFailed(e.to_string()))
    }
}

fn user_metadata(payload: &SsoPayload) -> Value {
    serde_json::json!({
        "full_name": payload.display_name(),
        "organization_id": payload.organization_id,
        "sso_user": true,
    })
}
