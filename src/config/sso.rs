use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// SSO bootstrap configuration: where the signing hub and the identity
/// provider's admin API live, and how identity resolution behaves.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SsoConfig {
    /// Hub endpoint that verifies `{payload, signature}` pairs.
    #[serde(default = "default_hub_url")]
    #[validate(custom(function = "validate_http_url"))]
    pub hub_url: String,

    /// Base URL of the identity provider's auth API (e.g.
    /// `https://project.example.com/auth/v1`).
    #[serde(default = "default_auth_url")]
    #[validate(custom(function = "validate_http_url"))]
    pub auth_url: String,

    /// Service-role key for the identity provider's admin API.
    #[serde(default)]
    pub service_key: String,

    /// Assign payloads without `organization_id` to the oldest organization.
    /// Deprecated; kept for hubs that predate organization claims.
    #[serde(default)]
    pub legacy_org_fallback: bool,

    /// Page size when scanning the identity provider's user list.
    #[serde(default = "default_user_scan_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub user_scan_page_size: u32,

    /// Maximum pages scanned before giving up on a user list lookup.
    #[serde(default = "default_user_scan_max_pages")]
    #[validate(range(min = 1, max = 100))]
    pub user_scan_max_pages: u32,
}

impl Default for SsoConfig {
    fn default() -> Self {
        Self {
            hub_url: default_hub_url(),
            auth_url: default_auth_url(),
            service_key: String::new(),
            legacy_org_fallback: false,
            user_scan_page_size: default_user_scan_page_size(),
            user_scan_max_pages: default_user_scan_max_pages(),
        }
    }
}

fn default_hub_url() -> String {
    "http://localhost:8000/api/verify-signature".to_string()
}

fn default_auth_url() -> String {
    "http://localhost:9999".to_string()
}

fn default_user_scan_page_size() -> u32 {
    1000
}

fn default_user_scan_max_pages() -> u32 {
    1
}

/// Accept only absolute `http`/`https` URLs with a host.
fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    let valid = url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("http_url");
        err.message = Some(Cow::Owned(format!("'{value}' is not an http(s) URL")));
        Err(err)
    }
}
