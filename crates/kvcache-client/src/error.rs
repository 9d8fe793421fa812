//! Cache client error types

use thiserror::Error;

/// Cache client errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Key not found: {key}")]
    NotFound { key: String },

    #[error("Redis transport error: {0}")]
    Transport(String),

    #[error("Invalid Redis URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid Redis address: {0}")]
    InvalidAddress(String),

    #[error("No cluster node addresses configured")]
    NoClusterNodes,

    #[error("TLS material error: {0}")]
    Tls(String),

    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Whether the key or hash simply does not exist
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the failure came from the connection rather than the data
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        let missing = CacheError::not_found("user:1");
        let lost = CacheError::Transport("connection reset".to_string());
        let slow = CacheError::Timeout { timeout_ms: 50 };

        assert!(missing.is_not_found());
        assert!(!missing.is_transport());
        assert!(lost.is_transport());
        assert!(!lost.is_not_found());
        assert!(slow.is_transport());
        assert_eq!(missing.to_string(), "Key not found: user:1");
    }
}
