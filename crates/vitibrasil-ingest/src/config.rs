//! Configuration management
//!
//! [`IngestConfig`] is built once at startup and handed to every pipeline.
//! Values come from the environment (after loading `.env`), falling back to
//! the defaults below.

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default base location of the published CSV files.
pub const DEFAULT_BASE_URL: &str = "http://vitibrasil.cnpuv.embrapa.br";

/// Default directory searched for local copies of the source files.
pub const DEFAULT_CACHE_DIR: &str = "./data/cache";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tokens meaning "not informed" in the published files.
pub const DEFAULT_SENTINELS: &[&str] = &["nd", "+", "*", "-", "", "null", "none", "na", "nan"];

/// Default database URL (file-backed SQLite, created on first use).
pub const DEFAULT_DATABASE_URL: &str = "sqlite://vitibrasil.db?mode=rwc";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Remote base URL; source paths are appended to it
    pub base_url: String,

    /// Directory checked for `<basename>` before going to the network
    pub cache_dir: PathBuf,

    /// HTTP timeout in seconds (single attempt, no retry)
    pub timeout_secs: u64,

    /// Whether a forced reingestion (clear + ingest) is permitted
    pub allow_reingest: bool,

    /// Lower-cased "not available" tokens mapped to zero
    pub sentinels: Vec<String>,

    pub database: DatabaseConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            allow_reingest: false,
            sentinels: DEFAULT_SENTINELS.iter().map(|s| s.to_string()).collect(),
            database: DatabaseConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = IngestConfig {
            base_url: lookup("EMBRAPA_BASE_URL").unwrap_or(defaults.base_url),
            cache_dir: lookup("INGEST_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            timeout_secs: lookup("INGEST_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
            allow_reingest: lookup("ALLOW_REINGEST")
                .map(|s| parse_flag(&s))
                .unwrap_or(defaults.allow_reingest),
            sentinels: lookup("INGEST_SENTINELS")
                .map(|s| parse_sentinels(&s))
                .unwrap_or(defaults.sentinels),
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(defaults.database.max_connections),
                connect_timeout_secs: lookup("DATABASE_CONNECT_TIMEOUT")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(defaults.database.connect_timeout_secs),
            },
        };

        config.validate()?;

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_allow_reingest(mut self, allow: bool) -> Self {
        self.allow_reingest = allow;
        self
    }

    /// Source URL for a relative path, tolerant of stray slashes on either side
    pub fn source_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(IngestError::Config("Base URL cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(IngestError::Config("Timeout must be greater than 0".to_string()));
        }

        if self.database.url.trim().is_empty() {
            return Err(IngestError::Config("Database URL cannot be empty".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(IngestError::Config(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

// Empty entries are kept: the empty string is itself a sentinel.
fn parse_sentinels(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = IngestConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.allow_reingest);
        assert!(config.sentinels.iter().any(|s| s.is_empty()));
        assert!(config.sentinels.contains(&"nd".to_string()));
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_environment_overrides() {
        let config = IngestConfig::from_lookup(lookup_from(&[
            ("EMBRAPA_BASE_URL", "http://localhost:9999"),
            ("INGEST_TIMEOUT_SECS", "5"),
            ("ALLOW_REINGEST", "True"),
            ("INGEST_SENTINELS", "ND, -,"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.timeout_secs, 5);
        assert!(config.allow_reingest);
        assert_eq!(config.sentinels, vec!["nd", "-", ""]);
        assert_eq!(config.database.url, "sqlite::memory:");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(IngestConfig::default().with_base_url("").validate().is_err());
        assert!(IngestConfig::default().with_timeout_secs(0).validate().is_err());

        let mut config = IngestConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_url_joins_cleanly() {
        let config = IngestConfig::default().with_base_url("http://example.test/");
        assert_eq!(
            config.source_url("/download/Producao.csv"),
            "http://example.test/download/Producao.csv"
        );
    }
}
