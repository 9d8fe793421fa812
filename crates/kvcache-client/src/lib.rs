//! # kvcache Client
//!
//! Supervised connection management for a Redis-compatible cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application Layer                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       CacheManager                           │
//! │     store / retrieve / store_map / retrieve_map / json       │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │  Supervisor<single>     │   │   Supervisor<cluster>        │
//! │  lazy connect, check,   │   │   lazy connect, check,       │
//! │  reconnect              │   │   reconnect                  │
//! └─────────────────────────┘   └──────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │        Connector / CacheHandle (Redis, optional mTLS)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kvcache_client::CacheManager;
//! use kvcache_config::get_config;
//!
//! let config = get_config()?;
//! let cache = CacheManager::connect_lazy(config.redis().clone());
//!
//! cache.store("session:abc123", "user_data").await?;
//! let value = cache.retrieve("session:abc123").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod connection;
pub mod error;
pub mod manager;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use connection::{
    ClusterOptions, ConnectionOptions, ConnectionSource, ConnectionState, Supervisor,
    TlsMaterial,
};
pub use error::{CacheError, Result};
pub use manager::{CacheManager, SharedCacheManager, shared_manager};
pub use transport::{
    CacheHandle, ClusterConnector, ClusterHandle, Connector, HandleKind, RedisHandle,
    SingleNodeConnector, SingleNodeHandle,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_connect_lazy_opens_nothing() {
        let manager = CacheManager::connect_lazy(kvcache_config::RedisSettings::default());

        assert_eq!(manager.active_kind(), HandleKind::SingleNode);
        assert_eq!(manager.generation(HandleKind::SingleNode), 0);
        assert_eq!(
            tokio_test::block_on(manager.state(HandleKind::SingleNode)),
            ConnectionState::Absent
        );
    }
}
