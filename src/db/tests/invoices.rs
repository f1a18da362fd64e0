//! Shared tests for InvoiceRepo implementations

use chrono::NaiveDate;
use rust_decimal::dec;
use uuid::Uuid;

use super::harness::{Seed, at};
use crate::{
    db::{error::DbError, repos::InvoiceRepo},
    models::{MatchTarget, NewInvoice},
};

fn new_invoice(org_id: Uuid) -> NewInvoice {
    NewInvoice {
        organization_id: org_id,
        supplier: "Ljudteknik AB".to_string(),
        invoice_number: Some("INV-9".to_string()),
        amount: dec!(1250.50),
        invoice_date: NaiveDate::from_ymd_opt(2025, 5, 2),
        due_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        notes: Some("Cost center: 42".to_string()),
        file_url: None,
    }
}

pub async fn test_project_invoice(seed: &dyn Seed, repo: &dyn InvoiceRepo) {
    let org = seed.organization("Org", at(0)).await;
    let project = seed.project(org, "P", None, "planning", at(1)).await;

    let id = repo
        .create(MatchTarget::Project(project), &new_invoice(org))
        .await
        .expect("Failed to insert invoice");

    assert_eq!(seed.count("project_invoices").await, 1);
    assert_eq!(seed.count("packing_invoices").await, 0);

    assert_eq!(
        seed.text_column("project_invoices", id, "project_id").await,
        Some(project.to_string())
    );
    assert_eq!(
        seed.text_column("project_invoices", id, "invoice_number").await.as_deref(),
        Some("INV-9")
    );
    assert_eq!(seed.text_column("project_invoices", id, "status").await.as_deref(), Some("unpaid"));
    assert_eq!(
        seed.text_column("project_invoices", id, "invoice_date").await.as_deref(),
        Some("2025-05-02")
    );
    let amount: rust_decimal::Decimal = seed
        .text_column("project_invoices", id, "amount")
        .await
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(amount, dec!(1250.50));
}

pub async fn test_packing_invoice(seed: &dyn Seed, repo: &dyn InvoiceRepo) {
    let org = seed.organization("Org", at(0)).await;
    let packing = seed.packing_job(org, "Pack", "planning", at(1)).await;

    let mut input = new_invoice(org);
    input.invoice_number = None;
    let id = repo
        .create(MatchTarget::Packing(packing), &input)
        .await
        .expect("Failed to insert invoice");

    assert_eq!(
        seed.text_column("packing_invoices", id, "packing_id").await,
        Some(packing.to_string())
    );
    assert_eq!(seed.text_column("packing_invoices", id, "large_project_id").await, None);
    assert_eq!(seed.text_column("packing_invoices", id, "invoice_number").await, None);
}

pub async fn test_large_project_invoice(seed: &dyn Seed, repo: &dyn InvoiceRepo) {
    let org = seed.organization("Org", at(0)).await;
    let large = seed.large_project(org, "Tour", "planning", at(1)).await;

    let id = repo
        .create(MatchTarget::LargeProject(large), &new_invoice(org))
        .await
        .expect("Failed to insert invoice");

    assert_eq!(seed.text_column("packing_invoices", id, "packing_id").await, None);
    assert_eq!(
        seed.text_column("packing_invoices", id, "large_project_id").await,
        Some(large.to_string())
    );
    assert_eq!(seed.count("project_invoices").await, 0);
}

pub async fn test_unmatched_is_rejected(seed: &dyn Seed, repo: &dyn InvoiceRepo) {
    let org = seed.organization("Org", at(0)).await;

    let result = repo.create(MatchTarget::Unmatched, &new_invoice(org)).await;
    assert!(matches!(result, Err(DbError::Validation(_))));
    assert_eq!(seed.count("project_invoices").await, 0);
    assert_eq!(seed.count("packing_invoices").await, 0);
}

pub async fn test_missing_target_fails(seed: &dyn Seed, repo: &dyn InvoiceRepo) {
    let org = seed.organization("Org", at(0)).await;

    let result = repo
        .create(MatchTarget::Project(Uuid::new_v4()), &new_invoice(org))
        .await;
    assert!(matches!(result, Err(DbError::Sqlx(_))));
}

#[cfg(feature = "database-sqlite")]
mod sqlite_tests {
    use super::*;
    use crate::db::{sqlite::SqliteInvoiceRepo, tests::harness::migrated_sqlite_pool};

    #[tokio::test]
    async fn sqlite_project_invoice() {
        let pool = migrated_sqlite_pool().await;
        test_project_invoice(&pool, &SqliteInvoiceRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_packing_invoice() {
        let pool = migrated_sqlite_pool().await;
        test_packing_invoice(&pool, &SqliteInvoiceRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_large_project_invoice() {
        let pool = migrated_sqlite_pool().await;
        test_large_project_invoice(&pool, &SqliteInvoiceRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_unmatched_is_rejected() {
        let pool = migrated_sqlite_pool().await;
        test_unmatched_is_rejected(&pool, &SqliteInvoiceRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_missing_target_fails() {
        let pool = migrated_sqlite_pool().await;
        test_missing_target_fails(&pool, &SqliteInvoiceRepo::new(pool.clone())).await;
    }
}

#[cfg(feature = "database-postgres")]
mod postgres_tests {
    use super::*;
    use crate::db::{
        postgres::PostgresInvoiceRepo, tests::harness::postgres::migrated_postgres_pool,
    };

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_project_invoice() {
        let pool = migrated_postgres_pool().await;
        test_project_invoice(&pool, &PostgresInvoiceRepo::new(pool.clone(), None)).await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_packing_invoice() {
        let pool = migrated_postgres_pool().await;
        test_packing_invoice(&pool, &PostgresInvoiceRepo::new(pool.clone(), None)).await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_large_project_invoice() {
        let pool = migrated_postgres_pool().await;
        test_large_project_invoice(&pool, &PostgresInvoiceRepo::new(pool.clone(), None)).await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_unmatched_is_rejected() {
        let pool = migrated_postgres_pool().await;
        test_unmatched_is_rejected(&pool, &PostgresInvoiceRepo::new(pool.clone(), None)).await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_missing_target_fails() {
        let pool = migrated_postgres_pool().await;
        test_missing_target_fails(&pool, &PostgresInvoiceRepo::new(pool.clone(), None)).await;
    }
}
