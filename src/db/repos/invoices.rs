use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{MatchTarget, NewInvoice},
};

#[async_trait]
pub trait InvoiceRepo: Send + Sync {
    /// Insert one invoice row into the table `target` selects and return its id.
    ///
    /// Project matches go to `project_invoices`; packing and large-project
    /// matches go to `packing_invoices`. `MatchTarget::Unmatched` is a
    /// validation error.
    async fn create(&self, target: MatchTarget, input: &NewInvoice) -> DbResult<Uuid>;
}
