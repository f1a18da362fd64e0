use serde::{Deserialize, Serialize};
use validator::Validate;

/// Supplier-invoice webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InvoicesConfig {
    /// Shared secret callers present in `x-api-key` or as a bearer token.
    /// Empty means every request is rejected.
    #[serde(default)]
    pub api_key: String,

    /// Currency that is not worth noting on the invoice record.
    #[serde(default = "default_currency")]
    #[validate(length(min = 3, max = 3))]
    pub default_currency: String,
}

impl Default for InvoicesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            default_currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "SEK".to_string()
}
