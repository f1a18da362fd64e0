mod hub;
mod identity;
mod webhook_key;

pub use hub::{HUB_ERROR_CODE, HttpHubVerifier, HubError, HubVerifier, INVALID_SIGNATURE_CODE};
pub use identity::{
    AdminApiIdentityProvider, IdentityError, IdentityProvider, IdentityUser, NewIdentity, Session,
};
pub use webhook_key::{API_KEY_HEADER, WebhookAuthError, authenticate_webhook, extract_webhook_key};
