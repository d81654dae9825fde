//! Postgres data access for the Flowsync template sync service.
//!
//! Two independent stores are accessed, each through its own pool:
//!
//! - the **account store** (users, subscription tiers, feature enablement)
//! - the **workspace store** (admin templates, folders, per-user copies)
//!
//! Neither schema belongs to this service; no migrations are run and no
//! tables are created. There is no cross-store transaction -- consistency
//! between the two stores is best-effort.

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Cheap connectivity probe used by the health endpoint.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
