//! Parameterized statements for the `gym` schema, organized by table.
//!
//! Every function runs exactly one statement on a `&mut PgConnection`, so
//! the same call works on a pooled connection or inside a transaction.

pub mod activity;
pub mod member;
pub mod membership;
pub mod payment;
pub mod plan;
pub mod staff;

use crate::error::{AppError, AppResult};

/// An `INSERT ... RETURNING` must yield its row.
pub(crate) fn expect_inserted<T>(row: Option<T>, table: &str) -> AppResult<T> {
    row.ok_or_else(|| AppError::Internal(format!("insert into {} affected no rows", table)))
}
