//! Persistence layer: connection pool, migrations, row models, and
//! repositories. Every state transition and balance mutation in this crate
//! is a single conditional/atomic SQL statement; correctness under
//! concurrent requests comes from the database, not application memory.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod pricing;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Error type for repository operations that mix SQL failures with domain
/// rules (payout validation, state checks). Pure CRUD methods return plain
/// `sqlx::Error`.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] hrkey_core::error::CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Cheap connectivity probe, used at startup and by the health endpoint.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
