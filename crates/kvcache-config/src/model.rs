//! # Configuration Model
//!
//! Strongly-shaped view of `config.yaml`. Every field has a default so a
//! partial file still loads.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// ROOT
// =============================================================================

/// Root configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheSection,
    pub database: DatabaseSection,
}

impl Config {
    /// Parse a configuration document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document is malformed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // Empty and `~` documents are `null`, which the derived impl rejects.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    /// Cache connection settings
    #[must_use]
    pub const fn redis(&self) -> &RedisSettings {
        &self.cache.redis
    }
}

/// `cache:` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub redis: RedisSettings,
}

/// `database:` section, carried for completeness
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub mysql: MySqlSettings,
}

/// `database.mysql:` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MySqlSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub db: String,
}

// =============================================================================
// REDIS
// =============================================================================

const DEFAULT_HEALTH_CHECK_INTERVAL_SECS: u64 = 5;
const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// `cache.redis:` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RedisSettings {
    /// Connection URL; takes precedence over `address` when non-empty
    pub url: String,

    /// `host:port` of a single node
    pub address: String,

    pub username: String,
    pub password: String,

    /// Logical database index
    pub db: i64,

    /// Key expiration in seconds, `0` for none
    pub expiration: u64,

    /// Seed nodes of a cluster deployment
    #[serde(alias = "clusteraddress")]
    pub cluster_address: Vec<String>,

    pub tls: TlsSettings,

    /// Seconds a successful health check stays fresh; `0` checks on every access
    pub health_check_interval: u64,

    /// Milliseconds allowed for connect, health check and each command; `0` disables
    pub timeout: u64,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            address: "127.0.0.1:6379".to_string(),
            username: String::new(),
            password: String::new(),
            db: 0,
            expiration: 0,
            cluster_address: Vec::new(),
            tls: TlsSettings::default(),
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL_SECS,
            timeout: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl RedisSettings {
    /// Expiration applied to stored keys, `None` when keys never expire
    #[must_use]
    pub const fn expiration(&self) -> Option<Duration> {
        if self.expiration == 0 {
            None
        } else {
            Some(Duration::from_secs(self.expiration))
        }
    }

    #[must_use]
    pub const fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval)
    }

    /// Per-operation timeout, `None` when disabled
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout))
        }
    }

    /// Whether cache traffic goes to a cluster rather than a single node
    #[must_use]
    pub fn is_clustered(&self) -> bool {
        !self.cluster_address.is_empty()
    }
}

/// `cache.redis.tls:` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    pub enabled: bool,

    /// Client certificate (PEM)
    pub cert: PathBuf,

    /// Client private key (PEM)
    pub key: PathBuf,

    /// CA bundle (PEM)
    pub ca: PathBuf,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            cert: PathBuf::from("certs/redis_user.crt"),
            key: PathBuf::from("certs/redis_user_private.key"),
            ca: PathBuf::from("certs/redis_ca.pem"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_document() {
        let yaml = r#"
cache:
  redis:
    url: ""
    address: "cache.internal:6380"
    username: "svc"
    password: "secret"
    db: 2
    expiration: 60
    clusterAddress:
      - "10.0.0.1:7000"
      - "10.0.0.2:7000"
database:
  mysql:
    host: "db.internal"
    username: "app"
    password: "pw"
    db: "auth"
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        let redis = config.redis();

        assert_eq!(redis.address, "cache.internal:6380");
        assert_eq!(redis.username, "svc");
        assert_eq!(redis.db, 2);
        assert_eq!(redis.expiration(), Some(Duration::from_secs(60)));
        assert_eq!(redis.cluster_address.len(), 2);
        assert!(redis.is_clustered());
        assert_eq!(config.database.mysql.db, "auth");
    }

    #[test]
    fn test_lowercase_cluster_alias() {
        let yaml = "cache:\n  redis:\n    clusteraddress: [\"a:1\"]\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.redis().cluster_address, vec!["a:1".to_string()]);
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("").unwrap();
        let redis = config.redis();

        assert_eq!(redis.address, "127.0.0.1:6379");
        assert_eq!(redis.expiration(), None);
        assert_eq!(redis.health_check_interval(), Duration::from_secs(5));
        assert_eq!(redis.timeout(), Some(Duration::from_millis(3000)));
        assert!(!redis.tls.enabled);
        assert!(!redis.is_clustered());
    }

    #[test]
    fn test_null_document_uses_defaults() {
        for yaml in ["~\n", "null", "---\n~\n"] {
            assert_eq!(Config::from_yaml_str(yaml).unwrap(), Config::default(), "{yaml:?}");
        }
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        assert!(Config::from_yaml_str("42").is_err());
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = Config::from_yaml_str("cache:\n  redis:\n    timeout: 0\n").unwrap();
        assert_eq!(config.redis().timeout(), None);
    }

    #[test]
    fn test_tls_section() {
        let yaml = r"
cache:
  redis:
    tls:
      enabled: true
      cert: /etc/redis/user.crt
      key: /etc/redis/user.key
      ca: /etc/redis/ca.pem
";
        let config = Config::from_yaml_str(yaml).unwrap();
        let tls = &config.redis().tls;

        assert!(tls.enabled);
        assert_eq!(tls.ca, PathBuf::from("/etc/redis/ca.pem"));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(Config::from_yaml_str("cache: [unclosed").is_err());
    }
}
