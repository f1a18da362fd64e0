use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::InvoiceRepo,
    },
    models::{INVOICE_STATUS_UNPAID, MatchTarget, NewInvoice},
};

pub struct PostgresInvoiceRepo {
    write_pool: PgPool,
}

impl PostgresInvoiceRepo {
    pub fn new(write_pool: PgPool, _read_pool: Option<PgPool>) -> Self {
        Self { write_pool }
    }
}

#[async_trait]
impl InvoiceRepo for PostgresInvoiceRepo {
    async fn create(&self, target: MatchTarget, input: &NewInvoice) -> DbResult<Uuid> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let query = match target {
            MatchTarget::Project(project_id) => sqlx::query(
                r#"
                INSERT INTO project_invoices (
                    id, organization_id, project_id, supplier, invoice_number, amount,
                    invoice_date, due_date, status, notes, file_url, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(id)
            .bind(input.organization_id)
            .bind(project_id),
            MatchTarget::Packing(_) | MatchTarget::LargeProject(_) => {
                let (packing_id, large_project_id) = match target {
                    MatchTarget::Packing(packing_id) => (Some(packing_id), None),
                    _ => (None, target.id()),
                };
                sqlx::query(
                    r#"
                    INSERT INTO packing_invoices (
                        id, organization_id, packing_id, large_project_id, supplier,
                        invoice_number, amount, invoice_date, due_date, status, notes,
                        file_url, created_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                    "#,
                )
                .bind(id)
                .bind(input.organization_id)
                .bind(packing_id)
                .bind(large_project_id)
            }
            MatchTarget::Unmatched => {
                return Err(DbError::Validation(
                    "An unmatched invoice has no target table".into(),
                ));
            }
        };

        query
            .bind(&input.supplier)
            .bind(&input.invoice_number)
            .bind(input.amount)
            .bind(input.invoice_date)
            .bind(input.due_date)
            .bind(INVOICE_STATUS_UNPAID)
            .bind(&input.notes)
            .bind(&input.file_url)
            .bind(now)
            .execute(&self.write_pool)
            .await?;

        Ok(id)
    }
}
