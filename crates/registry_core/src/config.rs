//! Runtime configuration for the registry core.
//!
//! # Responsibility
//! - Describe where the store lives and how the connection pool behaves.
//! - Resolve configuration from `REGISTRY_*` environment variables.
//!
//! # Invariants
//! - `pool_max_size` is always at least 1.
//! - Malformed environment values are reported, never silently replaced.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the database file (`:memory:` selects memory).
pub const ENV_DB_PATH: &str = "REGISTRY_DB_PATH";
/// Environment variable overriding the maximum pooled connection count.
pub const ENV_POOL_MAX: &str = "REGISTRY_POOL_MAX";
/// Environment variable overriding the store busy timeout in milliseconds.
pub const ENV_BUSY_TIMEOUT_MS: &str = "REGISTRY_BUSY_TIMEOUT_MS";

const DEFAULT_DB_FILE_NAME: &str = "registry.sqlite3";
const DEFAULT_POOL_MAX_SIZE: usize = 10;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);
const MEMORY_LOCATION: &str = ":memory:";

/// Where the relational store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// SQLite database file, created on first use.
    File(PathBuf),
    /// Process-private in-memory store that lives as long as its pool.
    Memory,
}

/// Connection and pool settings for one registry store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub database: DatabaseLocation,
    /// Upper bound on simultaneously handed-out connections.
    pub pool_max_size: usize,
    /// How long a statement waits on a locked store before failing.
    pub busy_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            database: DatabaseLocation::File(std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl RegistryConfig {
    /// Config for a fresh in-memory store with default pool settings.
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseLocation::Memory,
            ..Self::default()
        }
    }

    /// Config for a file-backed store with default pool settings.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            database: DatabaseLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// Returns a copy with a different pool bound (clamped to at least 1).
    pub fn pool_max_size(mut self, max_size: usize) -> Self {
        self.pool_max_size = max_size.max(1);
        self
    }

    /// Resolves configuration from process environment.
    ///
    /// # Errors
    /// - Returns `ConfigError::InvalidValue` for unparsable numeric values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.database = if path == MEMORY_LOCATION {
                DatabaseLocation::Memory
            } else {
                DatabaseLocation::File(PathBuf::from(path))
            };
        }

        if let Some(raw) = read(ENV_POOL_MAX) {
            let max_size = raw
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_POOL_MAX,
                    value: raw.clone(),
                    reason: "expected a positive integer",
                })?;
            config.pool_max_size = max_size;
        }

        if let Some(raw) = read(ENV_BUSY_TIMEOUT_MS) {
            let millis = raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_BUSY_TIMEOUT_MS,
                    value: raw.clone(),
                    reason: "expected milliseconds as a non-negative integer",
                })?;
            config.busy_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

/// Configuration resolution error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, DatabaseLocation, RegistryConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH,
        ENV_POOL_MAX,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = RegistryConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.pool_max_size, 10);
        assert_eq!(config.busy_timeout, Duration::from_secs(30));
    }

    #[test]
    fn memory_marker_selects_in_memory_store() {
        let config = RegistryConfig::from_lookup(lookup(&[(ENV_DB_PATH, " :memory: ")])).unwrap();
        assert_eq!(config.database, DatabaseLocation::Memory);
    }

    #[test]
    fn overrides_are_applied() {
        let config = RegistryConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/var/lib/registry/data.sqlite3"),
            (ENV_POOL_MAX, "3"),
            (ENV_BUSY_TIMEOUT_MS, "1500"),
        ]))
        .unwrap();
        assert_eq!(
            config.database,
            DatabaseLocation::File(PathBuf::from("/var/lib/registry/data.sqlite3"))
        );
        assert_eq!(config.pool_max_size, 3);
        assert_eq!(config.busy_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = RegistryConfig::from_lookup(lookup(&[(ENV_POOL_MAX, "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_POOL_MAX,
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let err =
            RegistryConfig::from_lookup(lookup(&[(ENV_BUSY_TIMEOUT_MS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_BUSY_TIMEOUT_MS));
    }

    #[test]
    fn pool_max_size_builder_clamps_to_one() {
        let config = RegistryConfig::in_memory().pool_max_size(0);
        assert_eq!(config.pool_max_size, 1);
    }
}
