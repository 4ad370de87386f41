//! Schema installation and validation.

use crate::db::DbPool;
use crate::error::AppResult;

/// Schema every table lives in.
pub const SCHEMA: &str = "gym";

/// DDL for the whole schema. Idempotent.
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Tables the workflows and reports read or write.
pub const REQUIRED_TABLES: [&str; 13] = [
    "gym_member",
    "membership",
    "plan",
    "plan_type_info",
    "staff_member",
    "desk",
    "trainer",
    "manager",
    "payment",
    "check_in",
    "guest",
    "guest_visit",
    "trainer_trains_member",
];

/// Install the bundled schema.
pub async fn install(pool: &DbPool) -> AppResult<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    tracing::info!(schema = SCHEMA, "Database schema installed");
    Ok(())
}

/// Tables from [`REQUIRED_TABLES`] that do not exist.
pub async fn validate(pool: &DbPool) -> AppResult<Vec<String>> {
    let existing_tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables WHERE table_schema = $1",
    )
    .bind(SCHEMA)
    .fetch_all(pool)
    .await?;

    Ok(missing_tables(&existing_tables))
}

fn missing_tables(existing: &[String]) -> Vec<String> {
    REQUIRED_TABLES
        .iter()
        .filter(|t| !existing.iter().any(|e| e == *t))
        .map(|s| s.to_string())
        .collect()
}
