//! Configuration module for the gym console.
//!
//! Connection settings are read from a `key=value` properties file using
//! `dotenvy`'s line parser and deserialized with `envy`.

mod database;

pub use database::{DatabaseConfig, PROPERTIES_FILE};
