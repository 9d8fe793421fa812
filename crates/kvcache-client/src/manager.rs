//! # Cache Manager
//!
//! Explicitly constructed owner of the single-node and cluster supervisors,
//! plus the string and hash operations bound to whichever kind the
//! configuration selects.

use kvcache_config::RedisSettings;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::Arc;

use crate::connection::supervisor::with_timeout;
use crate::connection::{ConnectionState, Supervisor};
use crate::error::{CacheError, Result};
use crate::transport::{
    CacheHandle, ClusterConnector, Connector, HandleKind, SingleNodeConnector,
};

/// Supervised cache client
pub struct CacheManager<S: Connector = SingleNodeConnector, C: Connector = ClusterConnector> {
    settings: RedisSettings,
    single: Supervisor<S>,
    cluster: Supervisor<C>,
}

impl CacheManager {
    /// Build a manager over Redis connectors. No connection is opened until
    /// the first operation.
    #[must_use]
    pub fn connect_lazy(settings: RedisSettings) -> Self {
        let single = SingleNodeConnector::new(settings.clone());
        let cluster = ClusterConnector::new(settings.clone());
        Self::with_connectors(settings, single, cluster)
    }
}

impl<S: Connector, C: Connector> CacheManager<S, C> {
    pub fn with_connectors(settings: RedisSettings, single: S, cluster: C) -> Self {
        let interval = settings.health_check_interval();
        let timeout = settings.timeout();
        Self {
            single: Supervisor::new(single, interval, timeout),
            cluster: Supervisor::new(cluster, interval, timeout),
            settings,
        }
    }

    pub const fn settings(&self) -> &RedisSettings {
        &self.settings
    }

    /// Kind of handle the data operations run on
    #[must_use]
    pub fn active_kind(&self) -> HandleKind {
        if self.settings.is_clustered() {
            HandleKind::Cluster
        } else {
            HandleKind::SingleNode
        }
    }

    // =========================================================================
    // HANDLES
    // =========================================================================

    /// Single-node handle, connecting or reconnecting as needed
    ///
    /// # Errors
    ///
    /// Returns the connect error; the next call retries.
    pub async fn client(&self) -> Result<Arc<S::Handle>> {
        self.single.acquire().await
    }

    /// Cluster handle, connecting or reconnecting as needed
    ///
    /// # Errors
    ///
    /// Returns the connect error; the next call retries.
    pub async fn cluster_client(&self) -> Result<Arc<C::Handle>> {
        self.cluster.acquire().await
    }

    /// Force a fresh connection of the active kind
    ///
    /// # Errors
    ///
    /// Returns the connect error.
    pub async fn reconnect(&self) -> Result<()> {
        match self.active_kind() {
            HandleKind::SingleNode => self.single.reconnect().await.map(|_| ()),
            HandleKind::Cluster => self.cluster.reconnect().await.map(|_| ()),
        }
    }

    pub async fn state(&self, kind: HandleKind) -> ConnectionState {
        match kind {
            HandleKind::SingleNode => self.single.state().await,
            HandleKind::Cluster => self.cluster.state().await,
        }
    }

    /// Number of handles built so far for `kind`
    #[must_use]
    pub fn generation(&self, kind: HandleKind) -> u64 {
        match kind {
            HandleKind::SingleNode => self.single.generation(),
            HandleKind::Cluster => self.cluster.generation(),
        }
    }

    pub const fn single_supervisor(&self) -> &Supervisor<S> {
        &self.single
    }

    pub const fn cluster_supervisor(&self) -> &Supervisor<C> {
        &self.cluster
    }

    async fn handle(&self) -> Result<Arc<dyn CacheHandle>> {
        Ok(match self.active_kind() {
            HandleKind::SingleNode => self.single.acquire().await? as Arc<dyn CacheHandle>,
            HandleKind::Cluster => self.cluster.acquire().await? as Arc<dyn CacheHandle>,
        })
    }

    /// Round-trip a PING over the active handle
    ///
    /// # Errors
    ///
    /// Transport, timeout or connect errors.
    pub async fn ping(&self) -> Result<()> {
        let handle = self.handle().await?;
        with_timeout(self.settings.timeout(), handle.ping()).await
    }

    // =========================================================================
    // STRING OPERATIONS
    // =========================================================================

    /// Set `key` to `value` with the configured expiration
    ///
    /// # Errors
    ///
    /// Transport, timeout or connect errors.
    pub async fn store(&self, key: &str, value: &str) -> Result<()> {
        let handle = self.handle().await?;
        let ttl = self.settings.expiration();
        with_timeout(self.settings.timeout(), handle.set(key, value, ttl)).await
    }

    /// Value stored at `key`
    ///
    /// # Errors
    ///
    /// [`CacheError::NotFound`] if the key does not exist, otherwise transport,
    /// timeout or connect errors.
    pub async fn retrieve(&self, key: &str) -> Result<String> {
        let handle = self.handle().await?;
        with_timeout(self.settings.timeout(), handle.get(key))
            .await?
            .ok_or_else(|| CacheError::not_found(key))
    }

    /// Serialize `value` as JSON and store it
    ///
    /// # Errors
    ///
    /// Serialization errors, or those of [`Self::store`].
    pub async fn store_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.store(key, &json).await
    }

    /// Retrieve a JSON value and deserialize it
    ///
    /// # Errors
    ///
    /// Deserialization errors, or those of [`Self::retrieve`].
    pub async fn retrieve_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let json = self.retrieve(key).await?;
        Ok(serde_json::from_str(&json)?)
    }

    // =========================================================================
    // HASH OPERATIONS
    // =========================================================================

    /// Write every field into hash `name`, one command per field.
    ///
    /// Stops at the first failure; fields written before it stay written.
    ///
    /// # Errors
    ///
    /// The first field write error.
    pub async fn store_map<K, V>(&self, name: &str, fields: &HashMap<K, V>) -> Result<()>
    where
        K: AsRef<str> + Sync,
        V: AsRef<str> + Sync,
    {
        let handle = self.handle().await?;
        let timeout = self.settings.timeout();

        for (field, value) in fields {
            let field = field.as_ref();
            if let Err(e) = with_timeout(timeout, handle.hset(name, field, value.as_ref())).await {
                tracing::warn!(map = name, field, error = %e, "Hash field write failed");
                return Err(e);
            }
        }
        Ok(())
    }

    /// All fields of hash `name`; empty if it does not exist
    ///
    /// # Errors
    ///
    /// Transport, timeout or connect errors.
    pub async fn retrieve_map(&self, name: &str) -> Result<HashMap<String, String>> {
        let handle = self.handle().await?;
        with_timeout(self.settings.timeout(), handle.hgetall(name)).await
    }
}

/// Shared cache manager wrapper
pub type SharedCacheManager = Arc<CacheManager>;

/// Create a shared cache manager
#[must_use]
pub fn shared_manager(manager: CacheManager) -> SharedCacheManager {
    Arc::new(manager)
}
