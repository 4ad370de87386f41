//! Database connection pool management.

use crate::config::DatabaseConfig;
use crate::error::AppResult;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Type alias for the PostgreSQL connection pool.
pub type DbPool = PgPool;

/// Create a new database connection pool.
///
/// Connects eagerly so that a bad URL or credentials fail at startup,
/// before the menu is shown.
///
/// # Errors
///
/// Returns an error if the URL is malformed or the first connection fails.
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout))
        .connect_with(config.connect_options()?)
        .await?;

    tracing::info!(
        username = %config.username,
        max_connections = config.max_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Check if the database connection is healthy.
pub async fn health_check(pool: &DbPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}
