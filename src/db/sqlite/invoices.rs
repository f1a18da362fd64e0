use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::InvoiceRepo,
    },
    models::{INVOICE_STATUS_UNPAID, MatchTarget, NewInvoice},
};

pub struct SqliteInvoiceRepo {
    pool: SqlitePool,
}

impl SqliteInvoiceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceRepo for SqliteInvoiceRepo {
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
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id.to_string())
            .bind(input.organization_id.to_string())
            .bind(project_id.to_string()),
            MatchTarget::Packing(_) | MatchTarget::LargeProject(_) => {
                let (packing_id, large_project_id) = match target {
                    MatchTarget::Packing(packing_id) => (Some(packing_id.to_string()), None),
                    _ => (None, target.id().map(|id| id.to_string())),
                };
                sqlx::query(
                    r#"
                    INSERT INTO packing_invoices (
                        id, organization_id, packing_id, large_project_id, supplier,
                        invoice_number, amount, invoice_date, due_date, status, notes,
                        file_url, created_at
                    )
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(id.to_string())
                .bind(input.organization_id.to_string())
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
            .bind(input.amount.to_string())
            .bind(input.invoice_date)
            .bind(input.due_date)
            .bind(INVOICE_STATUS_UNPAID)
            .bind(&input.notes)
            .bind(&input.file_url)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }
}
