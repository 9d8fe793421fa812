//! # Redis Transport
//!
//! Redis-backed connectors and handles. Single-node sessions use a
//! multiplexed connection, cluster sessions the async cluster connection;
//! both are cheap to clone, so each command works on its own clone.

use async_trait::async_trait;
use kvcache_config::RedisSettings;
use redis::aio::{ConnectionLike, MultiplexedConnection};
use redis::cluster::ClusterClientBuilder;
use redis::cluster_async::ClusterConnection;
use redis::{AsyncCommands, Client, TlsMode};
use std::collections::HashMap;
use std::time::Duration;

use super::traits::{CacheHandle, Connector, HandleKind};
use crate::connection::{ClusterOptions, ConnectionOptions, TlsMaterial};
use crate::error::Result;

/// Handle over any async Redis connection
#[derive(Clone)]
pub struct RedisHandle<C> {
    conn: C,
}

pub type SingleNodeHandle = RedisHandle<MultiplexedConnection>;
pub type ClusterHandle = RedisHandle<ClusterConnection>;

impl<C: Clone> RedisHandle<C> {
    /// Raw connection for commands not covered by [`CacheHandle`]
    pub fn connection(&self) -> C {
        self.conn.clone()
    }
}

#[async_trait]
impl<C> CacheHandle for RedisHandle<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => {
                let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn hset(&self, name: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hset::<_, _, _, ()>(name, field, value).await?;
        Ok(())
    }

    async fn hgetall(&self, name: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(name).await?;
        Ok(fields)
    }
}

// =============================================================================
// SINGLE NODE
// =============================================================================

/// Connects to one Redis node, by URL or composed address, with optional mutual TLS
#[derive(Debug, Clone)]
pub struct SingleNodeConnector {
    settings: RedisSettings,
}

impl SingleNodeConnector {
    #[must_use]
    pub const fn new(settings: RedisSettings) -> Self {
        Self { settings }
    }

    async fn client(&self) -> Result<Client> {
        let options = ConnectionOptions::from_settings(&self.settings)?;
        tracing::debug!(source = ?options.source, tls = options.uses_tls(), "Opening Redis client");

        let client = if self.settings.tls.enabled {
            let material = TlsMaterial::load(&self.settings.tls).await?;
            Client::build_with_tls(options.info, material.certificates())?
        } else {
            Client::open(options.info)?
        };
        Ok(client)
    }
}

#[async_trait]
impl Connector for SingleNodeConnector {
    type Handle = SingleNodeHandle;

    fn kind(&self) -> HandleKind {
        HandleKind::SingleNode
    }

    async fn connect(&self) -> Result<SingleNodeHandle> {
        let client = self.client().await?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(RedisHandle { conn })
    }
}

// =============================================================================
// CLUSTER
// =============================================================================

/// Connects to a Redis cluster through its seed nodes
#[derive(Debug, Clone)]
pub struct ClusterConnector {
    settings: RedisSettings,
}

impl ClusterConnector {
    #[must_use]
    pub const fn new(settings: RedisSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Connector for ClusterConnector {
    type Handle = ClusterHandle;

    fn kind(&self) -> HandleKind {
        HandleKind::Cluster
    }

    async fn connect(&self) -> Result<ClusterHandle> {
        let options = ClusterOptions::from_settings(&self.settings)?;
        tracing::debug!(
            nodes = options.nodes.len(),
            tls = options.tls,
            "Opening Redis cluster client"
        );

        let mut builder = ClusterClientBuilder::new(options.nodes);
        if let Some(username) = options.username {
            builder = builder.username(username);
        }
        if let Some(password) = options.password {
            builder = builder.password(password);
        }
        if let Some(timeout) = self.settings.timeout() {
            builder = builder.connection_timeout(timeout).response_timeout(timeout);
        }
        if options.tls {
            let material = TlsMaterial::load(&self.settings.tls).await?;
            builder = builder.tls(TlsMode::Secure).certs(material.certificates());
        }

        let client = builder.build()?;
        let conn = client.get_async_connection().await?;
        Ok(RedisHandle { conn })
    }
}
