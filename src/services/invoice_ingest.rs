use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use super::InvoiceMatcher;
use crate::{
    auth::WebhookAuthError,
    db::{DbError, DbPool, InvoiceRepo},
    models::{InvoicePayload, MatchOutcome, MatchTarget, NewInvoice},
};

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error(transparent)]
    Unauthorized(#[from] WebhookAuthError),

    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(String),

    #[error("SupplierName is required")]
    MissingSupplier,

    #[error("Invoice matching failed: {0}")]
    Lookup(#[source] DbError),

    #[error("Failed to insert invoice: {0}")]
    Insert(#[source] DbError),
}

/// Result of a successful ingest. Both variants answer 200.
#[derive(Debug)]
pub enum IngestOutcome {
    Matched {
        outcome: MatchOutcome,
        inserted_id: Uuid,
        invoice: NewInvoice,
    },
    Unmatched {
        outcome: MatchOutcome,
    },
}

/// Decode a webhook body. Requires a non-blank `SupplierName`.
pub fn parse_payload(body: &[u8]) -> Result<InvoicePayload, InvoiceError> {
    let payload: InvoicePayload =
        serde_json::from_slice(body).map_err(|e| InvoiceError::InvalidPayload(e.to_string()))?;

    if payload.supplier().is_none() {
        return Err(InvoiceError::MissingSupplier);
    }
    Ok(payload)
}

pub struct InvoiceIngestService {
    matcher: InvoiceMatcher,
    invoices: Arc<dyn InvoiceRepo>,
    default_currency: String,
}

impl InvoiceIngestService {
    pub fn new(
        matcher: InvoiceMatcher,
        invoices: Arc<dyn InvoiceRepo>,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            matcher,
            invoices,
            default_currency: default_currency.into(),
        }
    }

    pub fn from_db(db: &DbPool, default_currency: impl Into<String>) -> Self {
        Self::new(InvoiceMatcher::from_db(db), db.invoices(), default_currency)
    }

    /// Match the invoice and persist it when a target is found.
    ///
    /// Unmatched invoices are not stored; the full payload is logged at
    /// `warn` for manual triage instead.
    pub async fn ingest(&self, payload: &InvoicePayload) -> Result<IngestOutcome, InvoiceError> {
        let supplier = payload.supplier().ok_or(InvoiceError::MissingSupplier)?;

        tracing::info!(
            supplier,
            invoice_number = payload.invoice_number(),
            our_reference = payload.our_reference(),
            project = payload.project_hint(),
            "Received supplier invoice"
        );

        let outcome = self
            .matcher
            .match_invoice(payload)
            .await
            .map_err(InvoiceError::Lookup)?;

        for (step, strategy) in outcome.attempts.iter().enumerate() {
            tracing::debug!(step = step + 1, ?strategy, "Match strategy attempted");
        }

        let (target, organization_id) = match (outcome.target, outcome.organization_id) {
            (MatchTarget::Unmatched, _) | (_, None) => {
                tracing::warn!(
                    supplier,
                    trace = %outcome.match_detail,
                    notes = payload.notes(&self.default_currency, true).as_deref(),
                    payload = %serde_json::to_string(payload).unwrap_or_default(),
                    "Invoice could not be matched; not stored, needs manual handling"
                );
                return Ok(IngestOutcome::Unmatched { outcome });
            }
            (target, Some(organization_id)) => (target, organization_id),
        };

        if let MatchTarget::LargeProject(id) = target {
            tracing::warn!(
                large_project_id = %id,
                trace = %outcome.match_detail,
                "Invoice matched a large project; storing it with packing invoices"
            );
        }

        let invoice = payload
            .to_new_invoice(organization_id, &self.default_currency)
            .ok_or(InvoiceError::MissingSupplier)?;

        let inserted_id = self
            .invoices
            .create(target, &invoice)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, supplier, "Failed to insert invoice");
                InvoiceError::Insert(e)
            })?;

        tracing::info!(
            supplier,
            match_type = %outcome.match_type,
            trace = %outcome.match_detail,
            inserted_id = %inserted_id,
            table = target.table_name(),
            "Invoice matched and stored"
        );

        Ok(IngestOutcome::Matched {
            outcome,
            inserted_id,
            invoice,
        })
    }
}
