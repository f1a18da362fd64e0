//! `POST /receive-invoice`: supplier-invoice webhook.

use axum::{Json, body::Bytes, extract::State};
use http::HeaderMap;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::authenticate_webhook,
    models::{InvoicePayload, MatchStrategy, MatchType},
    services::{IngestOutcome, InvoiceError, parse_payload},
};

/// Success body. Unmatched invoices are a normal outcome and also answer 200.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvoiceResponse {
    Matched {
        match_type: MatchType,
        match_detail: String,
        inserted_id: Uuid,
        inserted_table: &'static str,
        supplier: String,
        #[serde(with = "rust_decimal::serde::float")]
        amount: Decimal,
        invoice_number: Option<String>,
    },
    Unmatched {
        message: String,
        match_attempts: MatchAttempts,
    },
}

/// What was tried for an unmatched invoice.
#[derive(Debug, Serialize)]
pub struct MatchAttempts {
    pub our_reference: Option<String>,
    pub project: Option<String>,
    pub attempted: Vec<MatchStrategy>,
    pub trace: String,
}

impl InvoiceResponse {
    fn new(payload: &InvoicePayload, outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Matched {
                outcome,
                inserted_id,
                invoice,
            } => InvoiceResponse::Matched {
                match_type: outcome.match_type,
                match_detail: outcome.match_detail,
                inserted_id,
                inserted_table: outcome.target.table_name().unwrap_or_default(),
                supplier: invoice.supplier,
                amount: invoice.amount,
                invoice_number: invoice.invoice_number,
            },
            IngestOutcome::Unmatched { outcome } => InvoiceResponse::Unmatched {
                message: "No matching booking or project found; invoice was not stored".into(),
                match_attempts: MatchAttempts {
                    our_reference: payload.our_reference().map(str::to_string),
                    project: payload.project_hint().map(str::to_string),
                    attempted: outcome.attempts,
                    trace: outcome.match_detail,
                },
            },
        }
    }
}

/// Authenticate, match, and store an inbound supplier invoice.
#[tracing::instrument(name = "webhook.receive_invoice", skip_all)]
pub async fn receive_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InvoiceResponse>, InvoiceError> {
    authenticate_webhook(&headers, &state.config.invoices.api_key)
        .inspect_err(|e| tracing::warn!(reason = %e, "Rejected invoice webhook"))?;

    let payload = parse_payload(&body)
        .inspect_err(|e| tracing::warn!(error = %e, "Invalid invoice payload"))?;
    let outcome = state.services.invoices.ingest(&payload).await?;

    Ok(Json(InvoiceResponse::new(&payload, outcome)))
}
