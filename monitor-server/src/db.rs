//! Database module - source PostgreSQL connection pool

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create the source database pool.
///
/// Connections are opened on first use, so the server boots (and serves
/// stored snapshots) while the source database is down.
pub fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(database_url)
}
