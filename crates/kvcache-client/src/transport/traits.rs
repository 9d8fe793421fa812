//! # Transport Traits
//!
//! Abstract handle and connector interfaces.
//! Implementations can be swapped for different backends (Redis, in-memory fakes, etc.)

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// Which kind of session a handle talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    SingleNode,
    Cluster,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleNode => f.write_str("single-node"),
            Self::Cluster => f.write_str("cluster"),
        }
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// An established session with the cache service
#[async_trait]
pub trait CacheHandle: Send + Sync {
    /// Liveness check
    async fn ping(&self) -> Result<()>;

    /// Set a string value, expiring after `ttl` when given
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Get a string value, `None` if the key does not exist
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set one field of a hash
    async fn hset(&self, name: &str, field: &str, value: &str) -> Result<()>;

    /// All fields of a hash, empty if the hash does not exist
    async fn hgetall(&self, name: &str) -> Result<HashMap<String, String>>;
}

// =============================================================================
// CONNECTOR
// =============================================================================

/// Builds new handles of one kind
#[async_trait]
pub trait Connector: Send + Sync {
    type Handle: CacheHandle + 'static;

    fn kind(&self) -> HandleKind;

    /// Establish a fresh session
    async fn connect(&self) -> Result<Self::Handle>;
}
