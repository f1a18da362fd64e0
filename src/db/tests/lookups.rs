//! Shared tests for the lookups invoice matching relies on: bookings,
//! projects, jobs, packing jobs and large projects.

use uuid::Uuid;

use super::harness::{Seed, at};
use crate::db::repos::{BookingRepo, JobRepo, LargeProjectRepo, PackingJobRepo, ProjectRepo};

pub async fn test_booking_number_is_exact(seed: &dyn Seed, repo: &dyn BookingRepo) {
    let org = seed.organization("Org", at(0)).await;
    let booking = seed.booking(org, "B-1001", None).await;

    let found = repo
        .get_by_booking_number("B-1001")
        .await
        .expect("Query failed")
        .expect("Booking should exist");
    assert_eq!(found.id, booking);
    assert_eq!(found.organization_id, org);
    assert!(found.assigned_project_id.is_none());

    // Case-sensitive, no substring matching
    assert!(repo.get_by_booking_number("b-1001").await.unwrap().is_none());
    assert!(repo.get_by_booking_number("B-100").await.unwrap().is_none());
}

pub async fn test_booking_assigned_project(seed: &dyn Seed, repo: &dyn BookingRepo) {
    let org = seed.organization("Org", at(0)).await;
    let assigned = Uuid::new_v4();
    seed.booking(org, "B-2", Some(assigned)).await;

    let found = repo.get_by_booking_number("B-2").await.unwrap().unwrap();
    assert_eq!(found.assigned_project_id, Some(assigned));
}

pub async fn test_project_by_id_skips_cancelled(seed: &dyn Seed, repo: &dyn ProjectRepo) {
    let org = seed.organization("Org", at(0)).await;
    let active = seed.project(org, "Active", None, "confirmed", at(1)).await;
    let cancelled = seed.project(org, "Gone", None, "Cancelled", at(2)).await;

    let project = repo.get_active_by_id(active).await.unwrap().unwrap();
    assert_eq!(project.name, "Active");
    assert_eq!(project.organization_id, org);

    assert!(repo.get_active_by_id(cancelled).await.unwrap().is_none());
    assert!(repo.get_active_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

pub async fn test_project_by_booking_oldest_active(seed: &dyn Seed, repo: &dyn ProjectRepo) {
    let org = seed.organization("Org", at(0)).await;
    let booking = seed.booking(org, "B-3", None).await;
    seed.project(org, "Cancelled first", Some(booking), "cancelled", at(1))
        .await;
    let oldest = seed.project(org, "Oldest", Some(booking), "planning", at(2)).await;
    seed.project(org, "Newest", Some(booking), "planning", at(3)).await;
    seed.project(org, "Unlinked", None, "planning", at(0)).await;

    let project = repo.find_active_by_booking(booking).await.unwrap().unwrap();
    assert_eq!(project.id, oldest);
    assert_eq!(project.booking_id, Some(booking));
}

pub async fn test_project_by_name(seed: &dyn Seed, repo: &dyn ProjectRepo) {
    let org = seed.organization("Org", at(0)).await;
    seed.project(org, "Sommarfestival 2025", None, "cancelled", at(1))
        .await;
    let second = seed
        .project(org, "Stora SOMMARFESTIVALEN", None, "planning", at(2))
        .await;
    seed.project(org, "Sommarfestival Göteborg", None, "planning", at(3))
        .await;

    let project = repo.find_active_by_name("  sommarfestival ").await.unwrap().unwrap();
    assert_eq!(project.id, second);

    assert!(repo.find_active_by_name("vinter").await.unwrap().is_none());
}

pub async fn test_project_name_wildcards_are_literal(seed: &dyn Seed, repo: &dyn ProjectRepo) {
    let org = seed.organization("Org", at(0)).await;
    seed.project(org, "Mässa", None, "planning", at(1)).await;
    let literal = seed.project(org, "Rabatt 50% mässa", None, "planning", at(2)).await;

    assert!(repo.find_active_by_name("%").await.unwrap().is_some());
    assert_eq!(
        repo.find_active_by_name("50%").await.unwrap().map(|p| p.id),
        Some(literal)
    );
    assert!(repo.find_active_by_name("_").await.unwrap().is_none());
}

pub async fn test_job_by_id(seed: &dyn Seed, repo: &dyn JobRepo) {
    let org = seed.organization("Org", at(0)).await;
    let job = seed.job(org, "Riggning").await;

    let found = repo.get_by_id(job).await.unwrap().unwrap();
    assert_eq!(found.name, "Riggning");
    assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

pub async fn test_packing_by_name(seed: &dyn Seed, repo: &dyn PackingJobRepo) {
    let org = seed.organization("Org", at(0)).await;
    seed.packing_job(org, "Packning Mässa", "cancelled", at(1)).await;
    let active = seed.packing_job(org, "Packning mässa B", "packing", at(2)).await;

    let found = repo.find_active_by_name("MÄSSA").await.unwrap().unwrap();
    assert_eq!(found.id, active);
    assert_eq!(found.status, "packing");
}

pub async fn test_large_project_by_name(seed: &dyn Seed, repo: &dyn LargeProjectRepo) {
    let org = seed.organization("Org", at(0)).await;
    let first = seed.large_project(org, "Arena Tour", "planning", at(1)).await;
    seed.large_project(org, "Arena Tour II", "planning", at(2)).await;

    let found = repo.find_active_by_name("arena tour").await.unwrap().unwrap();
    assert_eq!(found.id, first);
    assert_eq!(found.organization_id, org);
    assert!(repo.find_active_by_name("stadium").await.unwrap().is_none());
}

pub async fn test_names_fold_non_ascii_capitals(
    seed: &dyn Seed,
    projects: &dyn ProjectRepo,
    packing: &dyn PackingJobRepo,
    large: &dyn LargeProjectRepo,
) {
    let org = seed.organization("Org", at(0)).await;
    let project = seed.project(org, "Årsmöte Stockholm", None, "planning", at(1)).await;
    let packing_job = seed.packing_job(org, "Ölfestival Packning", "packing", at(2)).await;
    let large_project = seed.large_project(org, "Änglaturné 2025", "planning", at(3)).await;

    for needle in ["Årsmöte", "årsmöte", "ÅRSMÖTE STOCK"] {
        assert_eq!(
            projects.find_active_by_name(needle).await.unwrap().map(|p| p.id),
            Some(project),
            "{needle}"
        );
    }
    assert_eq!(
        packing.find_active_by_name("ölfestival").await.unwrap().map(|p| p.id),
        Some(packing_job)
    );
    assert_eq!(
        large.find_active_by_name("ÄNGLATURNÉ").await.unwrap().map(|p| p.id),
        Some(large_project)
    );
}

#[cfg(feature = "database-sqlite")]
mod sqlite_tests {
    use super::*;
    use crate::db::{sqlite::*, tests::harness::migrated_sqlite_pool};

    #[tokio::test]
    async fn sqlite_booking_number_is_exact() {
        let pool = migrated_sqlite_pool().await;
        test_booking_number_is_exact(&pool, &SqliteBookingRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_booking_assigned_project() {
        let pool = migrated_sqlite_pool().await;
        test_booking_assigned_project(&pool, &SqliteBookingRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_project_by_id_skips_cancelled() {
        let pool = migrated_sqlite_pool().await;
        test_project_by_id_skips_cancelled(&pool, &SqliteProjectRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_project_by_booking_oldest_active() {
        let pool = migrated_sqlite_pool().await;
        test_project_by_booking_oldest_active(&pool, &SqliteProjectRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_project_by_name() {
        let pool = migrated_sqlite_pool().await;
        test_project_by_name(&pool, &SqliteProjectRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_project_name_wildcards_are_literal() {
        let pool = migrated_sqlite_pool().await;
        test_project_name_wildcards_are_literal(&pool, &SqliteProjectRepo::new(pool.clone()))
            .await;
    }

    #[tokio::test]
    async fn sqlite_job_by_id() {
        let pool = migrated_sqlite_pool().await;
        test_job_by_id(&pool, &SqliteJobRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_packing_by_name() {
        let pool = migrated_sqlite_pool().await;
        test_packing_by_name(&pool, &SqlitePackingJobRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_large_project_by_name() {
        let pool = migrated_sqlite_pool().await;
        test_large_project_by_name(&pool, &SqliteLargeProjectRepo::new(pool.clone())).await;
    }

    #[tokio::test]
    async fn sqlite_names_fold_non_ascii_capitals() {
        let pool = migrated_sqlite_pool().await;
        test_names_fold_non_ascii_capitals(
            &pool,
            &SqliteProjectRepo::new(pool.clone()),
            &SqlitePackingJobRepo::new(pool.clone()),
            &SqliteLargeProjectRepo::new(pool.clone()),
        )
        .await;
    }

    #[tokio::test]
    async fn sqlite_oldest_first_across_timestamp_formats() {
        let pool = migrated_sqlite_pool().await;
        let org = pool.organization("Org", at(0)).await;

        // `CURRENT_TIMESTAMP` style, later in the day
        sqlx::query(
            "INSERT INTO projects (id, organization_id, name, status, created_at) \
             VALUES (?, ?, 'Vårmässa B', 'planning', '2025-03-01 12:00:00')",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(org.to_string())
        .execute(&pool)
        .await
        .unwrap();

        // RFC 3339 style, earlier the same day
        let older = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO projects (id, organization_id, name, status, created_at) \
             VALUES (?, ?, 'Vårmässa A', 'planning', '2025-03-01T09:00:00+00:00')",
        )
        .bind(older.to_string())
        .bind(org.to_string())
        .execute(&pool)
        .await
        .unwrap();

        let repo = SqliteProjectRepo::new(pool.clone());
        let found = repo.find_active_by_name("vårmässa").await.unwrap().unwrap();
        assert_eq!(found.id, older);
    }
}

#[cfg(feature = "database-postgres")]
mod postgres_tests {
    use super::*;
    use crate::db::{postgres::*, tests::harness::postgres::migrated_postgres_pool};

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_booking_number_is_exact() {
        let pool = migrated_postgres_pool().await;
        test_booking_number_is_exact(&pool, &PostgresBookingRepo::new(pool.clone(), None)).await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_project_by_booking_oldest_active() {
        let pool = migrated_postgres_pool().await;
        test_project_by_booking_oldest_active(&pool, &PostgresProjectRepo::new(pool.clone(), None))
            .await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_project_by_name() {
        let pool = migrated_postgres_pool().await;
        test_project_by_name(&pool, &PostgresProjectRepo::new(pool.clone(), None)).await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_project_name_wildcards_are_literal() {
        let pool = migrated_postgres_pool().await;
        test_project_name_wildcards_are_literal(
            &pool,
            &PostgresProjectRepo::new(pool.clone(), None),
        )
        .await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_packing_by_name() {
        let pool = migrated_postgres_pool().await;
        test_packing_by_name(&pool, &PostgresPackingJobRepo::new(pool.clone(), None)).await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_large_project_by_name() {
        let pool = migrated_postgres_pool().await;
        test_large_project_by_name(&pool, &PostgresLargeProjectRepo::new(pool.clone(), None))
            .await;
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn postgres_names_fold_non_ascii_capitals() {
        let pool = migrated_postgres_pool().await;
        test_names_fold_non_ascii_capitals(
            &pool,
            &PostgresProjectRepo::new(pool.clone(), None),
            &PostgresPackingJobRepo::new(pool.clone(), None),
            &PostgresLargeProjectRepo::new(pool.clone(), None),
        )
        .await;
    }
}
