//! # Configuration Store
//!
//! Loads a configuration file once and hands out the same instance on every
//! subsequent call.

use once_cell::sync::{Lazy, OnceCell};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::model::Config;

/// Fixed filename read by the default store
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Environment variable overriding [`DEFAULT_CONFIG_FILE`]
pub const CONFIG_PATH_ENV: &str = "KVCACHE_CONFIG";

static GLOBAL_STORE: Lazy<ConfigStore> = Lazy::new(|| {
    let path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
    ConfigStore::new(path)
});

/// Read and parse a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not valid configuration YAML.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Config::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Process-wide configuration, read from `config.yaml` (or `$KVCACHE_CONFIG`)
/// on first use.
///
/// # Errors
///
/// Returns the load error; a later call retries the load.
pub fn get_config() -> Result<&'static Config> {
    GLOBAL_STORE.get()
}

/// Lazily loaded, immutable configuration bound to one file path
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: OnceCell<Config>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: OnceCell::new(),
        }
    }

    /// Store pre-populated with an already built configuration
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            path: PathBuf::new(),
            config: OnceCell::with_value(config),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the configuration has been loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.config.get().is_some()
    }

    /// Return the configuration, loading it on the first successful call.
    ///
    /// # Errors
    ///
    /// Returns the load error; the store stays empty so the next call retries.
    pub fn get(&self) -> Result<&Config> {
        self.config.get_or_try_init(|| {
            let config = load_config(&self.path)?;
            tracing::info!(path = %self.path.display(), "Configuration loaded");
            Ok(config)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn test_singleton_identity() {
        let store = ConfigStore::new(fixture("url.yaml"));

        let first = store.get().unwrap();
        let second = store.get().unwrap();

        assert!(std::ptr::eq(first, second));
        assert!(store.is_loaded());
    }

    #[test]
    fn test_load_url_fixture() {
        let config = load_config(fixture("url.yaml")).unwrap();
        assert_eq!(config.redis().url, "redis://:hunter2@cache.internal:6379/3");
        assert_eq!(config.redis().expiration, 300);
    }

    #[test]
    fn test_load_address_fixture() {
        let config = load_config(fixture("address.yaml")).unwrap();
        let redis = config.redis();

        assert!(redis.url.is_empty());
        assert_eq!(redis.address, "10.1.2.3:6380");
        assert_eq!(redis.password, "hunter2");
        assert_eq!(redis.db, 4);
    }

    #[test]
    fn test_missing_file_is_retryable() {
        let store = ConfigStore::new(fixture("does-not-exist.yaml"));

        let err = store.get().unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(!store.is_loaded());
        assert!(store.get().is_err());
    }

    #[test]
    fn test_malformed_file() {
        let err = load_config(fixture("malformed.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_config() {
        let store = ConfigStore::from_config(Config::default());
        assert!(store.is_loaded());
        assert_eq!(store.get().unwrap(), &Config::default());
    }
}
