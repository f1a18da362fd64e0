mod invoice_ingest;
mod invoice_matcher;
mod sso_bootstrap;

use std::sync::Arc;

pub use invoice_ingest::{IngestOutcome, InvoiceError, InvoiceIngestService, parse_payload};
pub use invoice_matcher::InvoiceMatcher;
pub use sso_bootstrap::{
    SsoBootstrap, SsoBootstrapService, SsoError, SsoRequest, SsoUser, check_expiry, parse_request,
};

use crate::{
    auth::{AdminApiIdentityProvider, HttpHubVerifier},
    config::HooksConfig,
    db::DbPool,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub invoices: Arc<InvoiceIngestService>,
    pub sso: Arc<SsoBootstrapService>,
}

impl Services {
    /// Wire the services against the database and the configured remote
    /// endpoints. `client` is shared by the hub and identity-provider clients.
    pub fn new(db: &DbPool, config: &HooksConfig, client: reqwest::Client) -> Self {
        let hub = HttpHubVerifier::new(client.clone(), config.sso.hub_url.clone());
        let identity = AdminApiIdentityProvider::new(
            client,
            &config.sso.auth_url,
            config.sso.service_key.clone(),
        );

        Self {
            invoices: Arc::new(InvoiceIngestService::from_db(
                db,
                config.invoices.default_currency.clone(),
            )),
            sso: Arc::new(SsoBootstrapService::new(
                db,
                Arc::new(hub),
                Arc::new(identity),
                config.sso.clone(),
            )),
        }
    }
}
