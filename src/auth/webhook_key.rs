//! Shared-secret authentication for the invoice webhook.

use http::{HeaderMap, header::AUTHORIZATION};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Header carrying the webhook secret.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WebhookAuthError {
    /// No secret is configured, so nothing can authenticate.
    #[error("Webhook secret is not configured")]
    NotConfigured,

    #[error("Missing API key")]
    MissingCredentials,

    #[error("Invalid API key")]
    InvalidCredentials,
}

/// Key presented by the caller: `x-api-key`, else `Authorization: Bearer <key>`.
pub fn extract_webhook_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
    {
        return Some(key);
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

/// Compare the presented key against `expected` in constant time.
pub fn authenticate_webhook(headers: &HeaderMap, expected: &str) -> Result<(), WebhookAuthError> {
    if expected.is_empty() {
        return Err(WebhookAuthError::NotConfigured);
    }

    let presented = extract_webhook_key(headers).ok_or(WebhookAuthError::MissingCredentials)?;

    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(WebhookAuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use rstest::rstest;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[rstest]
    #[case(&[("x-api-key", "s3cret")], Ok(()))]
    #[case(&[("authorization", "Bearer s3cret")], Ok(()))]
    #[case(&[("x-api-key", "s3cret"), ("authorization", "Bearer wrong")], Ok(()))]
    #[case(&[("x-api-key", "wrong")], Err(WebhookAuthError::InvalidCredentials))]
    #[case(&[("x-api-key", "s3cre")], Err(WebhookAuthError::InvalidCredentials))]
    #[case(&[("authorization", "Basic s3cret")], Err(WebhookAuthError::MissingCredentials))]
    #[case(&[("x-api-key", "  ")], Err(WebhookAuthError::MissingCredentials))]
    #[case(&[], Err(WebhookAuthError::MissingCredentials))]
    fn test_authenticate(
        #[case] pairs: &[(&'static str, &'static str)],
        #[case] expected: Result<(), WebhookAuthError>,
    ) {
        assert_eq!(authenticate_webhook(&headers(pairs), "s3cret"), expected);
    }

    #[test]
    fn test_empty_secret_rejects_everything() {
        let result = authenticate_webhook(&headers(&[("x-api-key", "")]), "");
        assert_eq!(result, Err(WebhookAuthError::NotConfigured));

        let result = authenticate_webhook(&headers(&[("x-api-key", "anything")]), "");
        assert_eq!(result, Err(WebhookAuthError::NotConfigured));
    }
}
