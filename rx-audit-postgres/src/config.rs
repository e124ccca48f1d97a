//! Database configuration.
//!
//! Resolved once at process startup and handed to [`crate::PostgresRepositories`];
//! repositories never read the environment themselves.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "RX_AUDIT_DB_MAX_CONNECTIONS";
pub const ACQUIRE_TIMEOUT_VAR: &str = "RX_AUDIT_DB_ACQUIRE_TIMEOUT_SECS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    database_url: String,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(
        database_url: impl Into<String>,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let database_url = database_url.into();
        if database_url.trim().is_empty() {
            return Err(ConfigError::Missing(DATABASE_URL_VAR));
        }
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: MAX_CONNECTIONS_VAR,
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout,
        })
    }

    /// Reads the process environment. Call after `dotenvy::dotenv()` if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR).ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let max_connections = parse_or(&lookup, MAX_CONNECTIONS_VAR, DEFAULT_MAX_CONNECTIONS)?;
        let timeout_secs = parse_or(&lookup, ACQUIRE_TIMEOUT_VAR, DEFAULT_ACQUIRE_TIMEOUT_SECS)?;
        Self::new(database_url, max_connections, Duration::from_secs(timeout_secs))
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn acquire_timeout(&self) -> Duration {
        self.acquire_timeout
    }

    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.database_url)
            .await
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_apply() {
        let config = DatabaseConfig::from_lookup(lookup(&[(DATABASE_URL_VAR, "postgresql://localhost/rx")])).unwrap();
        assert_eq!(config.max_connections(), 5);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_and_errors() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            (DATABASE_URL_VAR, "postgresql://localhost/rx"),
            (MAX_CONNECTIONS_VAR, "12"),
            (ACQUIRE_TIMEOUT_VAR, "3"),
        ]))
        .unwrap();
        assert_eq!(config.max_connections(), 12);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(3));

        assert_eq!(
            DatabaseConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing(DATABASE_URL_VAR))
        );
        assert!(matches!(
            DatabaseConfig::from_lookup(lookup(&[
                (DATABASE_URL_VAR, "postgresql://localhost/rx"),
                (MAX_CONNECTIONS_VAR, "0"),
            ])),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            DatabaseConfig::from_lookup(lookup(&[
                (DATABASE_URL_VAR, "postgresql://localhost/rx"),
                (ACQUIRE_TIMEOUT_VAR, "soon"),
            ])),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
