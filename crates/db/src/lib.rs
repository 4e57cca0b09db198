//! Card storage.
//!
//! - [`CardRepo`](repositories::CardRepo): sqlx queries against the `cards`
//!   table.
//! - [`PgCardGateway`]: the PostgreSQL [`CardGateway`] used in production.
//! - [`MemoryCardGateway`]: an in-process [`CardGateway`] for tests and
//!   database-less runs.
//!
//! [`CardGateway`]: cardbus_core::gateway::CardGateway

use sqlx::postgres::PgPoolOptions;

pub mod gateway;
pub mod memory;
pub mod models;
pub mod repositories;

pub use gateway::PgCardGateway;
pub use memory::MemoryCardGateway;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
