mod error;
#[cfg(feature = "database-postgres")]
pub mod postgres;
pub mod repos;
#[cfg(feature = "database-sqlite")]
pub mod sqlite;

#[cfg(all(test, any(feature = "database-sqlite", feature = "database-postgres")))]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

/// PostgreSQL pool configuration with optional read replica.
#[cfg(feature = "database-postgres")]
pub struct PgPoolPair {
    /// Primary pool for writes.
    pub write: sqlx::PgPool,
    /// Optional read replica pool. If None, reads use the write pool.
    pub read: Option<sqlx::PgPool>,
}

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    organizations: Arc<dyn OrganizationRepo>,
    bookings: Arc<dyn BookingRepo>,
    projects: Arc<dyn ProjectRepo>,
    jobs: Arc<dyn JobRepo>,
    packing_jobs: Arc<dyn PackingJobRepo>,
    large_projects: Arc<dyn LargeProjectRepo>,
    invoices: Arc<dyn InvoiceRepo>,
    profiles: Arc<dyn ProfileRepo>,
    user_roles: Arc<dyn UserRoleRepo>,
}

enum PoolStorage {
    #[cfg(feature = "database-sqlite")]
    Sqlite(sqlx::SqlitePool),
    #[cfg(feature = "database-postgres")]
    Postgres(PgPoolPair),
    #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
    _None(std::convert::Infallible),
}

/// Database pool supporting both SQLite and PostgreSQL.
///
/// Repositories are cached at construction time to avoid allocation on each access.
pub struct DbPool {
    inner: PoolStorage,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    #[cfg(feature = "database-sqlite")]
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos {
            organizations: Arc::new(sqlite::SqliteOrganizationRepo::new(pool.clone())),
            bookings: Arc::new(sqlite::SqliteBookingRepo::new(pool.clone())),
            projects: Arc::new(sqlite::SqliteProjectRepo::new(pool.clone())),
            jobs: Arc::new(sqlite::SqliteJobRepo::new(pool.clone())),
            packing_jobs: Arc::new(sqlite::SqlitePackingJobRepo::new(pool.clone())),
            large_projects: Arc::new(sqlite::SqliteLargeProjectRepo::new(pool.clone())),
            invoices: Arc::new(sqlite::SqliteInvoiceRepo::new(pool.clone())),
            profiles: Arc::new(sqlite::SqliteProfileRepo::new(pool.clone())),
            user_roles: Arc::new(sqlite::SqliteUserRoleRepo::new(pool.clone())),
        };
        DbPool {
            inner: PoolStorage::Sqlite(pool),
            repos,
        }
    }

    /// Create a DbPool from existing PostgreSQL pools.
    #[cfg(feature = "database-postgres")]
    pub fn from_postgres(write_pool: sqlx::PgPool, read_pool: Option<sqlx::PgPool>) -> Self {
        let repos = CachedRepos {
            organizations: Arc::new(postgres::PostgresOrganizationRepo::new(
                write_pool.clone(),
                read_pool.clone(),
            )),
            bookings: Arc::new(postgres::PostgresBookingRepo::new(
                write_pool.clone(),
                read_pool.clone(),
            )),
            projects: Arc::new(postgres::PostgresProjectRepo::new(
                write_pool.clone(),
                read_pool.clone(),
            )),
            jobs: Arc::new(postgres::PostgresJobRepo::new(
                write_pool.clone(),
                read_pool.clone(),
            )),
            packing_jobs: Arc::new(postgres::PostgresPackingJobRepo::new(
                write_pool.clone(),
                read_pool.clone(),
            )),
            large_projects: Arc::new(postgres::PostgresLargeProjectRepo::new(
                write_pool.clone(),
                read_pool.clone(),
            )),
            invoices: Arc::new(postgres::PostgresInvoiceRepo::new(
                write_pool.clone(),
                read_pool.clone(),
            )),
            profiles: Arc::new(postgres::PostgresProfileRepo::new(
                write_pool.clone(),
                read_pool.clone(),
            )),
            user_roles: Arc::new(postgres::PostgresUserRoleRepo::new(
                write_pool.clone(),
                read_pool.clone(),
            )),
        };
        DbPool {
            inner: PoolStorage::Postgres(PgPoolPair {
                write: write_pool,
                read: read_pool,
            }),
            repos,
        }
    }

    /// Create a database pool from configuration
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::None => Err(DbError::NotConfigured),
            #[cfg(feature = "database-sqlite")]
            DatabaseConfig::Sqlite(cfg) => {
                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .connect_with(
                        sqlx::sqlite::SqliteConnectOptions::new()
                            .filename(&cfg.path)
                            .create_if_missing(cfg.create_if_missing)
                            .foreign_keys(true)
                            .journal_mode(if cfg.wal_mode {
                                sqlx::sqlite::SqliteJournalMode::Wal
                            } else {
                                sqlx::sqlite::SqliteJournalMode::Delete
                            })
                            .busy_timeout(std::time::Duration::from_millis(cfg.busy_timeout_ms)),
                    )
                    .await?;

                Ok(Self::from_sqlite(pool))
            }
            #[cfg(feature = "database-postgres")]
            DatabaseConfig::Postgres(cfg) => {
                let pool_options = || {
                    sqlx::postgres::PgPoolOptions::new()
                        .min_connections(cfg.min_connections)
                        .max_connections(cfg.max_connections)
                        .acquire_timeout(std::time::Duration::from_secs(cfg.connect_timeout_secs))
                        .idle_timeout(std::time::Duration::from_secs(cfg.idle_timeout_secs))
                };
                let connect_options = |url: &str| -> DbResult<sqlx::postgres::PgConnectOptions> {
                    let options: sqlx::postgres::PgConnectOptions = url.parse()?;
                    Ok(options.ssl_mode(cfg.ssl_mode.into()))
                };

                let write_pool = pool_options()
                    .connect_with(connect_options(&cfg.url)?)
                    .await?;

                let read_pool = if let Some(read_url) = &cfg.read_url {
                    tracing::info!("Configuring read replica pool");
                    Some(
                        pool_options()
                            .connect_with(connect_options(read_url)?)
                            .await?,
                    )
                } else {
                    None
                };

                Ok(Self::from_postgres(write_pool, read_pool))
            }
        }
    }

    /// Run database migrations using sqlx's migration runner
    /// This automatically creates and manages a _sqlx_migrations table
    /// Migrations always run on the primary (write) pool.
    pub async fn run_migrations(&self) -> DbResult<()> {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => {
                tracing::info!("Running SQLite migrations");
                sqlx::migrate!("./migrations_sqlx/sqlite").run(pool).await?;
                tracing::info!("SQLite migrations completed successfully");
                Ok(())
            }
            #[cfg(feature = "database-postgres")]
            PoolStorage::Postgres(pools) => {
                tracing::info!("Running PostgreSQL migrations");
                sqlx::migrate!("./migrations_sqlx/postgres")
                    .run(&pools.write)
                    .await?;
                tracing::info!("PostgreSQL migrations completed successfully");
                Ok(())
            }
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }

    /// Get organization repository
    pub fn organizations(&self) -> Arc<dyn OrganizationRepo> {
        Arc::clone(&self.repos.organizations)
    }

    /// Get booking repository
    pub fn bookings(&self) -> Arc<dyn BookingRepo> {
        Arc::clone(&self.repos.bookings)
    }

    /// Get project repository
    pub fn projects(&self) -> Arc<dyn ProjectRepo> {
        Arc::clone(&self.repos.projects)
    }

    /// Get job repository
    pub fn jobs(&self) -> Arc<dyn JobRepo> {
        Arc::clone(&self.repos.jobs)
    }

    /// Get packing job repository
    pub fn packing_jobs(&self) -> Arc<dyn PackingJobRepo> {
        Arc::clone(&self.repos.packing_jobs)
    }

    /// Get large project repository
    pub fn large_projects(&self) -> Arc<dyn LargeProjectRepo> {
        Arc::clone(&self.repos.large_projects)
    }

    /// Get invoice repository
    pub fn invoices(&self) -> Arc<dyn InvoiceRepo> {
        Arc::clone(&self.repos.invoices)
    }

    /// Get profile repository
    pub fn profiles(&self) -> Arc<dyn ProfileRepo> {
        Arc::clone(&self.repos.profiles)
    }

    /// Get user role repository
    pub fn user_roles(&self) -> Arc<dyn UserRoleRepo> {
        Arc::clone(&self.repos.user_roles)
    }

    /// Health check for database connectivity
    pub async fn health_check(&self) -> DbResult<()> {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            #[cfg(feature = "database-postgres")]
            PoolStorage::Postgres(pools) => {
                sqlx::query("SELECT 1").execute(&pools.write).await?;
                if let Some(read) = &pools.read {
                    sqlx::query("SELECT 1").execute(read).await?;
                }
                Ok(())
            }
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }
}
