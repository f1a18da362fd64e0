use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use uuid::Uuid;

/// Status every ingested invoice starts in.
pub const INVOICE_STATUS_UNPAID: &str = "unpaid";

/// Supplier-invoice webhook body, as sent by the accounting system.
///
/// Keys are PascalCase. Reference and number fields may arrive as JSON
/// strings or numbers; amounts may be numbers or numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoicePayload {
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub supplier_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub document_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub supplier_invoice_number: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub gross_total: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub net_total: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub our_reference: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub your_reference: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cost_center: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    /// Status string from the upstream accounting system.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Invoice row to insert once a match target is known.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub organization_id: Uuid,
    pub supplier: String,
    pub invoice_number: Option<String>,
    pub amount: Decimal,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub file_url: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl InvoicePayload {
    /// Trimmed supplier name, if present and non-blank.
    pub fn supplier(&self) -> Option<&str> {
        non_blank(&self.supplier_name)
    }

    /// `OurReference` exactly as sent, if non-blank. Booking numbers match
    /// byte for byte, so surrounding whitespace is kept.
    pub fn our_reference(&self) -> Option<&str> {
        self.our_reference
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Trimmed `Project`, if non-blank.
    pub fn project_hint(&self) -> Option<&str> {
        non_blank(&self.project)
    }

    /// `SupplierInvoiceNumber`, else `DocumentNumber`.
    pub fn invoice_number(&self) -> Option<&str> {
        non_blank(&self.supplier_invoice_number).or_else(|| non_blank(&self.document_number))
    }

    /// `Total`, else `GrossTotal`, else `NetTotal`, else zero. Rounded to cents.
    pub fn amount(&self) -> Decimal {
        self.total
            .or(self.gross_total)
            .or(self.net_total)
            .unwrap_or(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Secondary payload fields that have no column of their own, one per line.
    ///
    /// `unmatched` adds the reference fields matching was attempted with.
    pub fn notes(&self, default_currency: &str, unmatched: bool) -> Option<String> {
        let mut lines: Vec<String> = Vec::new();

        if let Some(comments) = non_blank(&self.comments) {
            lines.push(comments.to_string());
        }
        if let Some(reference) = non_blank(&self.your_reference) {
            lines.push(format!("Their reference: {reference}"));
        }
        if let Some(cost_center) = non_blank(&self.cost_center) {
            lines.push(format!("Cost center: {cost_center}"));
        }
        if let Some(currency) = non_blank(&self.currency)
            && !currency.eq_ignore_ascii_case(default_currency)
        {
            lines.push(format!("Currency: {currency}"));
        }
        if let (Some(gross), Some(net)) = (self.gross_total, self.net_total)
            && gross != net
        {
            lines.push(format!("Gross total {gross} differs from net total {net}"));
        }
        if let Some(status) = non_blank(&self.status) {
            lines.push(format!("Status: {status}"));
        }
        if let Some(number) = non_blank(&self.supplier_number) {
            lines.push(format!("Supplier number: {number}"));
        }
        if let Some(number) = non_blank(&self.document_number) {
            lines.push(format!("Document number: {number}"));
        }
        if unmatched {
            if let Some(reference) = self.our_reference() {
                lines.push(format!("Our reference: {reference}"));
            }
            if let Some(project) = self.project_hint() {
                lines.push(format!("Project: {project}"));
            }
        }

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Build the row to persist for a matched invoice.
    ///
    /// Returns `None` when the supplier name is missing; callers validate
    /// that before matching.
    pub fn to_new_invoice(&self, organization_id: Uuid, default_currency: &str) -> Option<NewInvoice> {
        Some(NewInvoice {
            organization_id,
            supplier: self.supplier()?.to_string(),
            invoice_number: self.invoice_number().map(str::to_string),
            amount: self.amount(),
            invoice_date: parse_date("InvoiceDate", self.invoice_date.as_deref()),
            due_date: parse_date("DueDate", self.due_date.as_deref()),
            notes: self.notes(default_currency, false),
            file_url: non_blank(&self.file_url).map(str::to_string),
        })
    }
}

/// Parse an ISO date, tolerating a trailing time component.
/// Unparseable values are dropped with a warning.
fn parse_date(field: &str, value: Option<&str>) -> Option<NaiveDate> {
    let raw = value.map(str::trim).filter(|s| !s.is_empty())?;
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);

    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(field, value = raw, error = %e, "Ignoring unparseable invoice date");
            None
        }
    }
}

/// Accept a string or a number for a text field.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

/// Accept a JSON number or a numeric string (`"1 234,50"` style included)
/// for an amount field.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
        }
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a number or numeric string, got {other}"
            )));
        }
    };

    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Some)
        .map_err(|_| D::Error::custom(format!("invalid amount '{text}'")))
}
