//! Database module for the gym console.
//!
//! This module provides database connectivity, models, and queries
//! for PostgreSQL using SQLx.

pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;

pub use pool::{create_pool, DbPool};
