//! Database configuration for the PostgreSQL connection.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::error::{AppError, AppResult};

/// Properties file read at startup, relative to the working directory.
pub const PROPERTIES_FILE: &str = "app.properties";

/// Database configuration loaded from the properties file.
///
/// Keys are prefixed with `db.`:
/// - `db.url`: PostgreSQL connection URL (required)
/// - `db.username`: Database user (required)
/// - `db.password`: Database password (default: empty)
/// - `db.max_connections`: Pool size (default: 5)
/// - `db.acquire_timeout`: Connection acquire timeout in seconds (default: 30)
/// - `db.init_schema`: Install `sql/schema.sql` at startup (default: false)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `postgres://localhost:5432/gym`
    pub url: String,

    /// Database user
    pub username: String,

    /// Database password
    #[serde(default)]
    pub password: String,

    /// Maximum connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout: u64,

    /// Install the bundled schema on startup
    #[serde(default)]
    pub init_schema: bool,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    30
}

impl DatabaseConfig {
    /// Load configuration from a properties file.
    ///
    /// A missing file, a malformed line or a missing required key is an error;
    /// the caller treats all of them as fatal.
    pub fn from_properties_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let lines = dotenvy::from_path_iter(path).map_err(|e| {
            AppError::Config(format!("Error loading {}: {}", path.display(), e))
        })?;
        let pairs = lines
            .collect::<Result<Vec<(String, String)>, _>>()
            .map_err(|e| AppError::Config(format!("Error parsing {}: {}", path.display(), e)))?;

        Self::from_pairs(pairs)
    }

    /// Build configuration from already-parsed `key=value` pairs.
    pub fn from_pairs<I>(pairs: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: DatabaseConfig = envy::prefixed("db.").from_iter(pairs)?;
        if config.url.trim().is_empty() {
            return Err(AppError::Config("db.url must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Get PostgreSQL connection options.
    pub fn connect_options(&self) -> AppResult<PgConnectOptions> {
        let options = PgConnectOptions::from_str(&self.url)
            .map_err(|e| AppError::Config(format!("Invalid db.url: {}", e)))?
            .username(&self.username)
            .password(&self.password);
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let config = DatabaseConfig::from_pairs(pairs(&[
            ("db.url", "postgres://localhost:5432/gym"),
            ("db.username", "gym"),
        ]))
        .unwrap();
        assert_eq!(config.password, "");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout, 30);
        assert!(!config.init_schema);
    }

    #[test]
    fn test_missing_required_key() {
        let err = DatabaseConfig::from_pairs(pairs(&[("db.url", "postgres://localhost/gym")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_unrelated_keys_ignored() {
        let config = DatabaseConfig::from_pairs(pairs(&[
            ("db.url", "postgres://localhost/gym"),
            ("db.username", "gym"),
            ("db.password", "secret"),
            ("ui.theme", "dark"),
        ]))
        .unwrap();
        assert_eq!(config.password, "secret");
    }

    #[test]
    fn test_from_properties_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# gym database").unwrap();
        writeln!(file, "db.url=postgres://localhost:5432/gym").unwrap();
        writeln!(file, "db.username=gym_admin").unwrap();
        writeln!(file, "db.password=hunter2").unwrap();
        writeln!(file, "db.max_connections=2").unwrap();

        let config = DatabaseConfig::from_properties_file(file.path()).unwrap();
        assert_eq!(config.url, "postgres://localhost:5432/gym");
        assert_eq!(config.username, "gym_admin");
        assert_eq!(config.max_connections, 2);
        assert!(config.connect_options().is_ok());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = DatabaseConfig::from_properties_file("/nonexistent/app.properties").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
